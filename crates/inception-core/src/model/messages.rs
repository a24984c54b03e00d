// Static table of controller review message codes.
//
// Codes arrive as `MessageCategory` on review events. The table is sorted
// by code so lookups can binary search.

/// One entry of the controller's message table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageInfo {
    pub code: u64,
    /// The controller's symbolic name, e.g. `Access_DoorUnlocked`.
    pub key: &'static str,
    pub description: &'static str,
}

/// Description used for codes missing from [`MESSAGES`].
pub const UNKNOWN_EVENT: &str = "Unknown event";

const fn m(code: u64, key: &'static str, description: &'static str) -> MessageInfo {
    MessageInfo {
        code,
        key,
        description,
    }
}

/// Look up a message code.
pub fn lookup(code: u64) -> Option<&'static MessageInfo> {
    MESSAGES
        .binary_search_by_key(&code, |info| info.code)
        .ok()
        .and_then(|idx| MESSAGES.get(idx))
}

/// Human description for a code, falling back to [`UNKNOWN_EVENT`].
pub fn describe(code: u64) -> &'static str {
    lookup(code).map_or(UNKNOWN_EVENT, |info| info.description)
}

#[rustfmt::skip]
pub static MESSAGES: &[MessageInfo] = &[
    m(0, "Unknown", "Unknown"),
    m(1, "System_Started", "System Started"),
    m(2, "System_AppVersion", "System Application Version"),
    m(3, "System_FWVersion", "System Firmware Version"),
    m(4, "System_SerialNumber", "System Serial Number"),
    m(5, "System_ProductVariant", "System Product Variant"),
    m(21, "System_ServiceModeEnabled", "Service Mode Enabled"),
    m(22, "System_ServiceModeUpdated", "Service Mode Updated"),
    m(23, "System_ServiceModeDisabled", "Service Mode Disabled"),
    m(24, "System_ServiceModeDisableAfterTime", "Service Mode Will Disable After Time"),
    m(25, "System_ServiceModeExpired", "Service Mode Expired"),
    m(41, "System_EthernetConnected", "Ethernet Network Connected"),
    m(42, "System_EthernetDisconnected", "Ethernet Network Disconnected"),
    m(43, "System_EthernetDHCPMode", "Ethernet set to DHCP mode"),
    m(44, "System_EthernetStaticMode", "Ethernet set to Static Address mode"),
    m(61, "System_SkyTunnelConnected", "Direct Ethernet SkyTunnel Connected"),
    m(62, "System_SkyTunnelDisconnected", "Direct Ethernet SkyTunnel Disconnected"),
    m(63, "System_SkyTunnelWebAccessEnabled", "SkyTunnel Web Access Enabled"),
    m(64, "System_SkyTunnelWebAccessDisabled", "SkyTunnel Web Access Disabled"),
    m(65, "System_SkyTunnelReportingEnabled", "SkyTunnel Reporting Enabled"),
    m(66, "System_SkyTunnelReportingDisabled", "SkyTunnel Reporting Disabled"),
    m(67, "System_SkyTunnelUnableReconnect", "Direct Ethernet SkyTunnel Unable to Connect"),
    m(68, "System_SkyTunnelFailedInitialization", "Direct Ethernet SkyTunnel Disconnected, Failed Initialization"),
    m(69, "System_SkyTunnelPathEstablished", "SkyTunnel Path Established"),
    m(70, "System_SkyTunnelPathLost", "SkyTunnel Path Lost"),
    m(91, "System_WiFiAPEnabled", "WiFi Access Point Enabled"),
    m(92, "System_WiFiAPDisabled", "WiFi Access Point Disabled"),
    m(93, "System_WiFiLocalNetworkConnected", "WiFi Local Network Connected"),
    m(94, "System_WiFiLocalNetworkConnectFailed", "WiFi Local Network Connection Failed"),
    m(95, "System_WiFiLocalNetworkDisconnected", "WiFi Local Network Disconnected"),
    m(96, "System_WiFiDisabled", "WiFi Disabled"),
    m(97, "System_WiFiConfiguredForAP", "WiFi Configured for Access Point Mode"),
    m(98, "System_WiFiConfiguredForPersonal", "WiFi Configured for Personal Network Mode"),
    m(99, "System_WiFiConfiguredForEnterprize", "WiFi Configured for Enterprise Network Mode"),
    m(100, "System_WiFiDetailedStatusChange", "WiFi Status Change"),
    m(121, "System_DateTimeChangeDetected", "Date and Time Change Detected"),
    m(122, "System_DateTimeManuallyChanged", "Date and Time Manually Updated"),
    m(123, "System_DateTimeTimezoneChanged", "System Timezone Changed"),
    m(124, "System_DateTimeNTPChanged", "NTP Server Change Detected"),
    m(141, "System_WebLoginSuccessful", "Web Login was Successful by User"),
    m(142, "System_WebLoginFailedUserUnknown", "Web Login Failed because Username was Unknown"),
    m(143, "System_WebLoginFailedCredentialsInvalid", "Web Login Failed because Credentials were Invalid"),
    m(144, "System_WebLoginFailedNoPermission", "Web Login Failed because User does not have Permission"),
    m(145, "System_WebLogoutSuccessful", "Web Logout was Successful by User"),
    m(146, "System_WebLoginFailedLockout", "Web Login Failed, subsequent login attempts will be blocked for a short time"),
    m(147, "System_WebLoginFailedUserExpired", "Web Login Failed because User is Expired"),
    m(148, "System_WebLoginFailedL3UserNotAllowed", "Web Login Failed because Level 3 User Access is not allowed"),
    m(149, "System_WebLoginTimedOut", "Web Login Session Timed Out from Inactivity"),
    m(150, "System_WebLoginFailedInvalid2FACode", "Web Login Failed because 2FA Code was Invalid"),
    m(151, "System_WebLoginTwoFactorBackupCodeUsed", "User 2FA Backup Code was used"),
    m(152, "System_WebLoginLockoutForgiven", "Web Login Lockout Forgiven"),
    m(153, "System_WebLoginLockoutAllUsersForgiven", "Web Login Lockout All Users Forgiven"),
    m(154, "System_WebLoginFailedInterventionLockout", "Web Login Failed, login attempts will be blocked until administrator intervention"),
    m(1500, "Audit_ItemCreated", "Item Created"),
    m(1501, "Audit_ItemChanged", "Item Changed"),
    m(1502, "Audit_ItemDeleted", "Item Deleted"),
    m(1503, "Audit_CustomItemImported", "Custom Item Imported"),
    m(1504, "Audit_CustomItemImportFailed", "Custom Item Import Failed"),
    m(1505, "Audit_Lvl3CreatedLvl2", "Level 3 User Created Level 2 User"),
    m(1506, "Audit_Lvl3DeletedLvl2", "Level 3 User Deleted Level 2 User"),
    m(1507, "Audit_WebLoginTwoFactorEnrolled", "User Enrolled a User for 2FA Login"),
    m(1508, "Audit_WebLoginTwoFactorUnenrolled", "User Unenrolled a User from 2FA Login"),
    m(1509, "Audit_UserPINRevealed", "User Revealed a User PIN"),
    m(1510, "Audit_UserPINSent", "User PIN Sent to User"),
    m(1511, "Audit_EntityPasswordRevealed", "User Revealed an Entity Password"),
    m(1550, "Audit_ReportGenerated", "Report Generated"),
    m(2000, "Access_DoorUnlocked", "Door Unlocked"),
    m(2001, "Access_DoorLocked", "Door Locked"),
    m(2002, "Access_DoorOpened", "Door Opened (unsecured)"),
    m(2003, "Access_DoorClosed", "Door Closed"),
    m(2004, "Access_DoorOpenTooLong", "Door Held Open Too Long"),
    m(2005, "Access_DoorClosedAfterOpenTooLong", "Door Closed After Being Held Open Too Long"),
    m(2006, "Access_DoorUserAccessGranted", "Door Access Granted for User"),
    m(2007, "Access_DoorUserAccessDeniedPermission", "Door User Access Denied because No Permission"),
    m(2008, "Access_DoorUserAccessDeniedLockOut", "Door User Access Denied because Door Locked Out"),
    m(2009, "OBSOLETE_Access_DoorUserPINValidSecondCredential", "User PIN Valid, Waiting for Card"),
    m(2010, "Access_DoorUserCardValidSecondCredential", "User Credential Valid, Waiting for Other Credential"),
    m(2011, "Access_DoorAccessButtonAccessGranted", "Door Access Granted from Access Button"),
    m(2012, "Access_DoorAccessButtonAccessDeniedLockout", "Door Access Denied from Access Button because Door Locked Out"),
    m(2013, "Access_DoorAutomationAccessGranted", "Door Access Granted from Automation"),
    m(2014, "Access_DoorAutomationAccessDeniedLockout", "Door Access Denied from Automation because Door Locked Out"),
    m(2015, "Access_DoorUserControlDeniedPermission", "Door Control by User Denied because No Permission"),
    m(2016, "Access_DoorOverrideSetToLock", "Door State Override set to Lock"),
    m(2017, "Access_DoorOverrideSetToUnlock", "Door State Override set to Unlock"),
    m(2018, "Access_DoorOverrideSetToLockOut", "Door State Override set to Lock out"),
    m(2019, "Access_DoorOverrideCleared", "Door State Override Cleared"),
    m(2020, "Access_DoorBreakglassBroken", "Door Breakglass Broken"),
    m(2021, "Access_DoorBreakglassRestored", "Door Breakglass Restored"),
    m(2022, "Access_DoorUserAccessDeniedAreaArmed", "Door User Access Denied because Area Armed"),
    m(2023, "Access_DoorAccessFailedNoDoor", "Door Access Failed, No Door Assigned"),
    m(2024, "Access_DoorOpenTooLongFailServiceMode", "Door Held Open Too Long Failed, Service Mode is Enabled"),
    m(2025, "Access_DoorUserCredentialRejectedAccessMode", "User Credential Type Rejected due to Access Mode"),
    m(2026, "Access_DoorUserAccessDeniedUserExpired", "Door User Access Denied because User Expired"),
    m(2027, "Access_DoorHeldResponseMuted", "Door Held Open Response Muted"),
    m(2028, "Access_AccessRequestsCancelled", "Door Grant Access Requests Cancelled"),
    m(2029, "Access_DoorForceSuppressed", "Door Forced Suppressed"),
    m(2030, "Access_DoorForceSuppressExpired", "Door Forced Suppress Expired"),
    m(2031, "Access_RfDoorManuallyOpened", "RF Door Manually Opened"),
    m(2032, "Access_RfDoorUnlockedOfflineCachedCard", "RF Door Unlocked While Offline by Cached Card"),
    m(2033, "Access_DoorUserCredentialMismatch", "Multi Credential Failed Due To Mismatched Credential"),
    m(2034, "Access_DoorUserCredentialTimeout", "Multi Credential Failed Due To Timeout"),
    m(3001, "Access_CardReadSuccessful", "Credential Read Successful"),
    m(3002, "Access_CardFailedUnknownReader", "Credential Read Failed because Reader was Unknown"),
    m(3003, "Access_CardFailedUnknownCard", "Credential Read Failed because Credential was Unknown"),
    m(3004, "Access_CardFailedParityFailed", "Credential Read Failed because Parity Check Failed"),
    m(3005, "Access_CardFailedUnknownSiteCode", "Credential Read Failed because Site Code was Unknown"),
    m(3006, "Access_CardFailedCardUnassigned", "Credential Read Failed because Credential is Unassigned"),
    m(3007, "Access_Card3BadgeDetected", "Card 3-Badge Action Detected"),
    m(3008, "Access_CardFailedReaderLockedOut", "Credential Read Failed because Reader is Locked Out"),
    m(3009, "Access_UserCancelledFirstCardUsed", "User Cancelled because First Credential Use"),
    m(3010, "Access_CardFailedWiringIssue", "Credential Read Failed, Potentially Incorrect D1/D0 Wiring"),
    m(3011, "Access_CardFailedCardStateInactive", "Credential Read Failed because Credential State was Inactive"),
    m(3012, "Access_CardFailedTemplateUnknown", "Credential Read Failed because Credential Template was Unknown"),
    m(3013, "Access_Card2BadgeDetected", "Card 2-Badge Action Detected"),
    m(3501, "Access_PINValid", "PIN Valid"),
    m(3502, "Access_PINFailedKeypadInvalid", "PIN Failed because Keypad Type is Invalid"),
    m(3503, "Access_PINFailedUnknownUser", "Invalid PIN Entered"),
    m(3504, "Access_PINFailedReaderLockedOut", "PIN Failed because Reader is Locked Out"),
    m(3505, "Access_UserCancelledFirstPINUsed", "User Cancelled because First PIN Use"),
    m(5000, "Security_AreaArmedByUser", "Area Armed by User"),
    m(5001, "Security_AreaArmedByUserWithExit", "Area Armed With Exit Delay by User"),
    m(5002, "Security_AreaArmedByTimePeriod", "Area Armed by Time Period"),
    m(5003, "Security_AreaArmedByInactivity", "Area Armed by Inactivity"),
    m(5004, "Security_AreaArmedByAutomation", "Area Armed by Automation"),
    m(5005, "Security_AreaArmedBySystem", "Area Armed by System"),
    m(5006, "Security_AreaArmWarningStarted", "Area Arm Warning Started"),
    m(5007, "Security_AreaArmFailNoPermission", "Area Arm Failed because User does not have Permission"),
    m(5008, "Security_AreaArmFailUnsealedInputs", "Area Arm Failed due to Unsealed Inputs"),
    m(5009, "Security_AreaArmUnnecessary", "Area Arm Unnecessary because Area is Already Armed"),
    m(5010, "Security_AreaArmFailModuleHealth", "Area Arm Failed due to Module Health Issues"),
    m(5011, "Security_AreaArmFailReportingPath", "Area Arm Failed due to Reporting Path Issues"),
    m(5012, "Security_AreaArmFailNotComplete", "Area Arm Failed because Arm Proceedure Not Completed"),
    m(5013, "Security_AreaExitCancelledModuleHealth", "Area Arm Cancelled because Module Issue"),
    m(5014, "Security_AreaExitCancelledInputEvent", "Area Arm Cancelled because Input Alarm"),
    m(5015, "Security_AreaArmFailUnackedMessages", "Area Arm Failed because Unacknowledged Messages"),
    m(5016, "Security_AreaArmWarningCancelledDueToActivity", "Area Arm Warning Cancelled by System due to Activity"),
    m(5201, "Security_AreaDisarmedByUser", "Area Disarmed by User"),
    m(5202, "Security_AreaDeferDisarmedByUser", "Area Time Disarmed by User"),
    m(5203, "Security_AreaDisarmedByTimePeriod", "Area Disarmed by Time Period"),
    m(5204, "Security_AreaDisarmedByAutomation", "Area Disarmed by Automation"),
    m(5205, "Security_AreaDisarmedBySystem", "Area Disarmed by System"),
    m(5206, "Security_AreaEntryDelayStarted", "Area Entry Delay Started"),
    m(5207, "Security_AreaDisarmFailNoPermission", "Area Disarm Failed because User does not have Permission"),
    m(5208, "Security_AreaDisarmUnnecessary", "Area Disarm Unnecessary because Area is Already Disarmed"),
    m(5401, "Security_InputDeisolatedByUser", "Input De-Isolated by User"),
    m(5402, "Security_InputDeisolatedByAutomation", "Input De-Isolated by Automation"),
    m(5403, "Security_InputDeisolatedBySystem", "Input De-Isolated by System"),
    m(5404, "Security_InputIsolatedByUser", "Input Isolated by User"),
    m(5405, "Security_InputIsolatedByAutomation", "Input Isolated by Automation"),
    m(5406, "Security_InputIsolatedBySystem", "Input Isolated by System"),
    m(5407, "Security_InputIsolatedTemporarilyByUser", "Input Temporarily Isolated by User"),
    m(5408, "Security_InputIsolatedTemporarilyBySystem", "Input Temporarily Isolated by System"),
    m(10000, "Hardware_LanModuleDiscovered", "LAN Module Discovered"),
    m(10001, "Hardware_LanModuleConnected", "LAN Module Connected"),
    m(10002, "Hardware_LanModuleDisconnected", "LAN Module Disconnected"),
    m(10003, "Hardware_LanModuleFWUpdateStarted", "LAN Module Firmware Update Started"),
    m(10004, "Hardware_LanModuleFWUpdateFailed", "LAN Module Firmware Update Failed"),
    m(10005, "Hardware_LanModuleFWUpdateCompleted", "LAN Module Firmware Update Completed"),
    m(10006, "Hardware_LanModuleFWVersion", "LAN Module Current Firmware"),
    m(10007, "Hardware_LanModuleFWVersionUpdated", "LAN Module F/W Version Detected"),
    m(10008, "Hardware_LANSecureRequested", "LAN Secure Requested"),
    m(10009, "Hardware_LANModuleSubstitutionDetected", "LAN Module Substitution Detected"),
    m(10010, "Hardware_LANModuleSubstitutionRestored", "LAN Module Substitution Restored"),
    m(10011, "Hardware_LANSecureDisabled", "LAN Secure Detection Disabled"),
    m(10012, "Hardware_LANModuleImpersonationDetected", "LAN Module Impersonation Detected"),
];

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_and_unique() {
        assert!(MESSAGES.windows(2).all(|w| w[0].code < w[1].code));
    }

    #[test]
    fn known_and_unknown_codes() {
        let info = lookup(1).unwrap();
        assert_eq!(info.key, "System_Started");
        assert_eq!(describe(1), "System Started");
        assert_eq!(describe(99_999), UNKNOWN_EVENT);
        assert!(lookup(99_999).is_none());
    }
}
