//! Per-record risk and severity tags, computed at render time and never stored.
//!
//! The watch-lists live in [`RiskRules`], which is loaded from the `[risk]`
//! config section so they can change without touching search code.
//!
//! The system score is a completeness heuristic: it counts how many
//! identifying fields a record carries. It says nothing about how dangerous
//! the machine is.

use crate::types::{non_blank, Credential, SystemRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

/// Stealer family severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "Info"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Critical => write!(f, "Critical"),
        }
    }
}

/// Derived tags for one record. `None` means "no signal", not "safe".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordAnnotation {
    pub risk_level: Option<RiskLevel>,
    pub severity: Option<Severity>,
}

impl RecordAnnotation {
    pub fn severity_label(&self) -> Option<String> {
        self.severity.map(|s| s.to_string())
    }
}

/// Watch-lists for the credential heuristics. Matching is a case-insensitive
/// substring test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRules {
    #[serde(default = "default_watch_domains")]
    pub watch_domains: Vec<String>,
    #[serde(default = "default_critical_stealers")]
    pub critical_stealers: Vec<String>,
    #[serde(default = "default_warning_stealers")]
    pub warning_stealers: Vec<String>,
}

fn default_watch_domains() -> Vec<String> {
    ["paypal", "amazon", "google", "microsoft", "apple", "facebook", "twitter"]
        .map(String::from)
        .to_vec()
}
fn default_critical_stealers() -> Vec<String> { vec!["redline".into(), "vidar".into()] }
fn default_warning_stealers() -> Vec<String> { vec!["raccoon".into(), "mars".into()] }

impl Default for RiskRules {
    fn default() -> Self {
        Self {
            watch_domains: default_watch_domains(),
            critical_stealers: default_critical_stealers(),
            warning_stealers: default_warning_stealers(),
        }
    }
}

impl RiskRules {
    /// `High` when the domain (or host) mentions a watched brand, otherwise no rating.
    pub fn domain_risk(&self, domain: Option<&str>) -> Option<RiskLevel> {
        let domain = non_blank(domain)?.to_lowercase();
        contains_any(&domain, &self.watch_domains).then_some(RiskLevel::High)
    }

    /// Severity of a stealer family; any unlisted non-empty name is `Info`.
    pub fn stealer_severity(&self, stealer: Option<&str>) -> Option<Severity> {
        let stealer = non_blank(stealer)?.to_lowercase();
        let severity = if contains_any(&stealer, &self.critical_stealers) {
            Severity::Critical
        } else if contains_any(&stealer, &self.warning_stealers) {
            Severity::Warning
        } else {
            Severity::Info
        };
        Some(severity)
    }

    pub fn annotate_credential(&self, credential: &Credential) -> RecordAnnotation {
        RecordAnnotation {
            risk_level: self.domain_risk(credential.domain_or_host()),
            severity: self.stealer_severity(credential.stealer_name.as_deref()),
        }
    }

    pub fn annotate_system(&self, system: &SystemRecord) -> RecordAnnotation {
        RecordAnnotation { risk_level: Some(system_risk(system)), severity: None }
    }
}

/// Completeness score over `ip_address`, `hardware_id`, `machine_id` and
/// `computer_name`: three or more present is `High`, two `Medium`, else `Low`.
pub fn system_risk(system: &SystemRecord) -> RiskLevel {
    let present = [
        system.ip_address.as_deref(),
        system.hardware_id.as_deref(),
        system.machine_id.as_deref(),
        system.computer_name.as_deref(),
    ]
    .into_iter()
    .filter(|v| non_blank(*v).is_some())
    .count();

    match present {
        n if n >= 3 => RiskLevel::High,
        2 => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .filter(|n| !n.is_empty())
        .any(|n| haystack.contains(&n.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn system(ip: bool, hwid: bool, mid: bool, name: bool) -> SystemRecord {
        let some = |on: bool, v: &str| on.then(|| v.to_string());
        SystemRecord {
            id: 1,
            machine_id: some(mid, "MID-1"),
            computer_name: some(name, "DESKTOP-1"),
            hardware_id: some(hwid, "HW-1"),
            machine_user: Some("bob".into()),
            ip_address: some(ip, "10.0.0.1"),
            country: Some("US".into()),
            log_date: None,
            upload_id: "u".into(),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(Some("login.paypal.com"), Some(RiskLevel::High))]
    #[case(Some("ACCOUNTS.GOOGLE.COM"), Some(RiskLevel::High))]
    #[case(Some("example.org"), None)]
    #[case(Some("  "), None)]
    #[case(None, None)]
    fn domain_risk(#[case] domain: Option<&str>, #[case] expected: Option<RiskLevel>) {
        assert_eq!(RiskRules::default().domain_risk(domain), expected);
    }

    #[rstest]
    #[case(Some("RedLine Stealer"), Some(Severity::Critical))]
    #[case(Some("vidar"), Some(Severity::Critical))]
    #[case(Some("Raccoon v2"), Some(Severity::Warning))]
    #[case(Some("Mars"), Some(Severity::Warning))]
    #[case(Some("Lumma"), Some(Severity::Info))]
    #[case(Some(""), None)]
    #[case(None, None)]
    fn stealer_severity(#[case] name: Option<&str>, #[case] expected: Option<Severity>) {
        assert_eq!(RiskRules::default().stealer_severity(name), expected);
    }

    #[rstest]
    #[case(system(true, true, true, true), RiskLevel::High)]
    #[case(system(true, true, true, false), RiskLevel::High)]
    #[case(system(true, false, false, true), RiskLevel::Medium)]
    #[case(system(false, false, false, true), RiskLevel::Low)]
    #[case(system(false, false, false, false), RiskLevel::Low)]
    fn system_completeness(#[case] record: SystemRecord, #[case] expected: RiskLevel) {
        assert_eq!(system_risk(&record), expected);
    }

    #[test]
    fn blank_fields_do_not_count() {
        let mut record = system(true, true, false, false);
        record.hardware_id = Some(String::new());
        assert_eq!(system_risk(&record), RiskLevel::Low);
    }

    #[test]
    fn injected_watch_list() {
        let rules = RiskRules { watch_domains: vec!["Coinbase".into()], ..RiskRules::default() };
        assert_eq!(rules.domain_risk(Some("www.coinbase.com")), Some(RiskLevel::High));
        assert_eq!(rules.domain_risk(Some("paypal.com")), None);
    }

    #[test]
    fn severity_label_text() {
        let ann = RecordAnnotation { risk_level: None, severity: Some(Severity::Critical) };
        assert_eq!(ann.severity_label().as_deref(), Some("Critical"));
        assert_eq!(RecordAnnotation::default().severity_label(), None);
    }
}
