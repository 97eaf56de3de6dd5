use super::machine::{SearchMachine, SearchStatus};
use crate::context::SearchContext;
use crate::pagination::PageLayout;
use crate::risk::{RecordAnnotation, RiskRules};
use crate::types::ResultSet;

/// Everything a renderer needs for one frame. Borrowed from the machine,
/// annotations computed fresh.
#[derive(Debug, Clone)]
pub struct SearchView<'a> {
    pub status: &'a SearchStatus,
    pub context: &'a SearchContext,
    pub results: Option<&'a ResultSet>,
    pub layout: Option<PageLayout>,
    /// One entry per displayed record, same order.
    pub annotations: Vec<RecordAnnotation>,
}

impl<'a> SearchView<'a> {
    pub fn new(machine: &'a SearchMachine, rules: &RiskRules) -> Self {
        let results = machine.results();
        Self {
            status: machine.status(),
            context: machine.context(),
            results,
            layout: machine.layout(),
            annotations: results.map(|set| annotate(rules, set)).unwrap_or_default(),
        }
    }

    /// Whether a pagination control should be drawn: results exist and span
    /// more than one page.
    pub fn shows_pagination(&self) -> bool {
        self.results.is_some_and(|set| !set.is_empty())
            && self.layout.as_ref().is_some_and(PageLayout::has_controls)
    }
}

pub fn annotate(rules: &RiskRules, set: &ResultSet) -> Vec<RecordAnnotation> {
    match set {
        ResultSet::Credentials(page) => page.records.iter().map(|c| rules.annotate_credential(c)).collect(),
        ResultSet::Systems(page) => page.records.iter().map(|s| rules.annotate_system(s)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::machine::{MachineSettings, SearchResponse};
    use crate::risk::RiskLevel;
    use crate::types::{EntityType, SearchResult, SystemRecord};
    use chrono::Utc;
    use tokio::time::Instant;

    fn system(id: i64, ip: Option<&str>) -> SystemRecord {
        SystemRecord {
            id,
            machine_id: Some("MID".into()),
            computer_name: Some("DESKTOP".into()),
            hardware_id: None,
            machine_user: None,
            ip_address: ip.map(String::from),
            country: None,
            log_date: None,
            upload_id: "u".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn annotations_follow_record_order() {
        let mut m = SearchMachine::new(EntityType::System, MachineSettings::default());
        let t0 = Instant::now();
        m.set_free_text("desktop", t0);
        let req = m.flush().unwrap();
        let set = ResultSet::Systems(SearchResult {
            records: vec![system(1, Some("10.0.0.1")), system(2, None)],
            total: 120,
            page: 1,
            page_size: 50,
        });
        m.accept(SearchResponse { generation: req.generation, outcome: Ok(set) });

        let view = SearchView::new(&m, &RiskRules::default());
        let levels: Vec<_> = view.annotations.iter().map(|a| a.risk_level).collect();
        assert_eq!(levels, vec![Some(RiskLevel::High), Some(RiskLevel::Medium)]);
        assert!(view.annotations.iter().all(|a| a.severity.is_none()));
        assert!(view.shows_pagination());
    }

    #[test]
    fn idle_view_is_bare() {
        let m = SearchMachine::new(EntityType::Credential, MachineSettings::default());
        let view = SearchView::new(&m, &RiskRules::default());
        assert_eq!(view.status, &SearchStatus::Idle);
        assert!(view.annotations.is_empty());
        assert!(!view.shows_pagination());
    }
}
