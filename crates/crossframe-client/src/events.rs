//! Console event names and tab-event qualification.

/// Console-fired event types.
pub mod console_event {
    /// A tab was closed.
    pub const CLOSE_TAB: &str = "SFORCE_CONSOLE:CLOSE_TAB";
    /// A tab was opened.
    pub const OPEN_TAB: &str = "SFORCE_CONSOLE:OPEN_TAB";
    /// The console user logged out.
    pub const CONSOLE_LOGOUT: &str = "SFORCE_CONSOLE:LOGOUT";
}

/// Presence-fired event types.
pub mod presence_event {
    /// Presence login succeeded.
    pub const LOGIN_SUCCESS: &str = "SFORCE_PRESENCE:LOGIN_SUCCESS";
    /// Presence status changed.
    pub const STATUS_CHANGED: &str = "SFORCE_PRESENCE:STATUS_CHANGED";
    /// Presence user logged out.
    pub const LOGOUT: &str = "SFORCE_PRESENCE:LOGOUT";
    /// A work item was assigned.
    pub const WORK_ASSIGNED: &str = "SFORCE_PRESENCE:WORK_ASSIGNED";
    /// A work item was accepted.
    pub const WORK_ACCEPTED: &str = "SFORCE_PRESENCE:WORK_ACCEPTED";
    /// A work item was declined.
    pub const WORK_DECLINED: &str = "SFORCE_PRESENCE:WORK_DECLINED";
    /// A work item was closed.
    pub const WORK_CLOSED: &str = "SFORCE_PRESENCE:WORK_CLOSED";
    /// The agent's workload changed.
    pub const WORKLOAD_CHANGED: &str = "SFORCE_PRESENCE:WORKLOAD_CHANGED";
}

const TAB_EVENT_SUFFIX: &str = "_TAB";
const EVENT_NAME_SEPARATOR: &str = ":";

const KNOWN_EVENT_TYPES: &[&str] = &[
    console_event::CLOSE_TAB,
    console_event::OPEN_TAB,
    console_event::CONSOLE_LOGOUT,
];

/// Returns true for the console's own top-level event types.
///
/// Presence event types are delivered through the same listener
/// channel but are not subject to tab qualification.
pub fn is_console_event_type(event_type: &str) -> bool {
    KNOWN_EVENT_TYPES.contains(&event_type)
}

/// Qualifies a console event type with a tab id.
///
/// Tab-scoped event types (ending in `_TAB`) get `:tabId` appended so
/// a listener observes one tab rather than all of them. Other types
/// and absent ids pass through unchanged.
pub fn qualified_event_type(event_type: &str, tab_id: Option<&str>) -> String {
    match tab_id {
        Some(tab_id) if event_type.ends_with(TAB_EVENT_SUFFIX) => {
            format!("{event_type}{EVENT_NAME_SEPARATOR}{tab_id}")
        }
        _ => event_type.to_string(),
    }
}

/// Level of link returned by the tab-link lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabLink {
    /// Link restoring the tab and all of its children.
    ParentAndChildren,
    /// Link restoring this tab only.
    TabOnly,
    /// The underlying standard URL.
    SalesforceUrl,
}

impl TabLink {
    /// Wire value of this link level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParentAndChildren => "complete",
            Self::TabOnly => "thistabonly",
            Self::SalesforceUrl => "standard",
        }
    }
}

/// Console regions addressable by the sidebar visibility call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Left sidebar.
    Left,
    /// Right sidebar.
    Right,
    /// Top sidebar.
    Top,
    /// Bottom sidebar.
    Bottom,
}

impl Region {
    /// Wire value of this region.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// Sidebar component types addressable by the focus call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    /// Canvas component.
    Canvas,
    /// Case experts widget.
    CaseExpertsWidget,
    /// Files widget.
    FilesWidget,
    /// Highlights panel.
    HighlightsPanel,
    /// Interaction log panel.
    InteractionLogPanel,
    /// Knowledge One sidebar.
    KnowledgeOne,
    /// Lookup component.
    Lookup,
    /// Milestone widget.
    MilestoneWidget,
    /// Related list.
    RelatedList,
    /// Report chart widget.
    ReportChartWidget,
    /// Topics widget.
    TopicsWidget,
    /// Visualforce page component.
    Visualforce,
}

impl ComponentType {
    /// Wire value of this component type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Canvas => "CANVAS",
            Self::CaseExpertsWidget => "CASE_EXPERTS_WIDGET",
            Self::FilesWidget => "FILES_WIDGET",
            Self::HighlightsPanel => "HIGHLIGHTS_PANEL",
            Self::InteractionLogPanel => "INTERACTION_LOG_PANEL",
            Self::KnowledgeOne => "KNOWLEDGE_ONE",
            Self::Lookup => "LOOKUP",
            Self::MilestoneWidget => "MILESTONE_WIDGET",
            Self::RelatedList => "RELATED_LIST",
            Self::ReportChartWidget => "REPORT_CHART_WIDGET",
            Self::TopicsWidget => "TOPICS_WIDGET",
            Self::Visualforce => "VISUALFORCE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_events_are_qualified_with_tab_id() {
        assert_eq!(
            qualified_event_type(console_event::CLOSE_TAB, Some("scc1")),
            "SFORCE_CONSOLE:CLOSE_TAB:scc1"
        );
        assert_eq!(
            qualified_event_type(console_event::OPEN_TAB, None),
            "SFORCE_CONSOLE:OPEN_TAB"
        );
    }

    #[test]
    fn non_tab_events_ignore_the_tab_id() {
        assert_eq!(
            qualified_event_type(console_event::CONSOLE_LOGOUT, Some("scc1")),
            "SFORCE_CONSOLE:LOGOUT"
        );
        assert_eq!(qualified_event_type("MY_CUSTOM_EVENT", Some("scc1")), "MY_CUSTOM_EVENT");
    }

    #[test]
    fn component_types_use_screaming_snake_wire_values() {
        assert_eq!(ComponentType::HighlightsPanel.as_str(), "HIGHLIGHTS_PANEL");
        assert_eq!(ComponentType::KnowledgeOne.as_str(), "KNOWLEDGE_ONE");
        assert_eq!(ComponentType::Visualforce.as_str(), "VISUALFORCE");
    }

    #[test]
    fn known_console_event_types() {
        assert!(is_console_event_type(console_event::OPEN_TAB));
        assert!(!is_console_event_type(presence_event::LOGIN_SUCCESS));
        assert!(!is_console_event_type("MY_CUSTOM_EVENT"));
    }
}
