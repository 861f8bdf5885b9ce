//! Free-text routing.
//!
//! Triggers are checked in table order and the first match wins. While the
//! single-color sub-mode has a target, every prompt goes to single-color
//! regeneration and the table is never consulted.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::orchestrator::Orchestrator;
use crate::session::errors::{ActionResult, ValidationError};
use crate::session::model::ChatEntry;
use crate::session::state::SingleColorMode;

/// Where a prompt was sent.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Saved-session listing.
    History,
    /// Pairwise contrast check.
    Contrast,
    /// Color-vision-deficiency check.
    Colorblind,
    /// Dissatisfaction regenerate.
    Regenerate,
    /// Generate or refine with the prompt itself.
    Generate,
    /// Single-swatch regeneration.
    SingleColor,
}

/// Trigger phrase table, in priority order.
pub const TRIGGERS: &[(Route, &[&str])] = &[
    (Route::History, &["查看历史", "show history"]),
    (Route::Contrast, &["对比度检查", "contrast check"]),
    (Route::Colorblind, &["色盲检查", "colorblind check"]),
    (Route::Regenerate, &["不满意", "not satisfied"]),
];

/// Pick the route for `text`.
#[must_use]
pub fn route_for(text: &str, single_color: &SingleColorMode) -> Route {
    if single_color.enabled && single_color.target_hex.is_some() {
        return Route::SingleColor;
    }
    let lowered = text.to_lowercase();
    TRIGGERS
        .iter()
        .find(|(_, phrases)| phrases.iter().any(|phrase| lowered.contains(phrase)))
        .map_or(Route::Generate, |(route, _)| *route)
}

impl Orchestrator {
    /// Handle one line typed by the user.
    ///
    /// The prompt is always recorded as a user entry before the routed action
    /// runs.
    ///
    /// # Errors
    /// Returns a validation error for a blank prompt, otherwise the error of
    /// the routed action.
    pub async fn send_prompt(&mut self, text: &str) -> ActionResult<Route> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyPrompt.into());
        }

        let route = route_for(text, &self.state.single_color);
        debug!("Dispatching prompt to {route:?}");
        self.append(ChatEntry::user_text(text)).await;

        match route {
            Route::SingleColor => {
                self.state.single_color.pending_prompt = text.to_string();
                self.regenerate_single_color().await?;
            }
            Route::History => {
                self.show_history();
            }
            Route::Contrast => {
                self.contrast_check().await?;
            }
            Route::Colorblind => {
                self.colorblind_check().await?;
            }
            Route::Regenerate => {
                self.regenerate().await?;
            }
            Route::Generate => {
                self.generate(text).await?;
            }
        }
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::color::science::HexColor;
    use crate::service::fake::{COOL, Call, ScriptedService, WARM, palette};
    use crate::session::config::PaletteConfig;
    use crate::session::errors::ActionError;
    use crate::session::model::{EntryKind, Role};
    use crate::store::records::MemoryRecordStore;

    fn fixture() -> (Arc<ScriptedService>, Orchestrator) {
        let service = Arc::new(ScriptedService::new());
        let orchestrator = Orchestrator::new(
            service.clone(),
            Arc::new(MemoryRecordStore::new()),
            &PaletteConfig::default(),
        );
        (service, orchestrator)
    }

    #[test]
    fn test_route_table() {
        let idle = SingleColorMode::default();
        let cases = [
            ("查看历史", Route::History),
            ("please Show History", Route::History),
            ("对比度检查一下", Route::Contrast),
            ("run a contrast check", Route::Contrast),
            ("色盲检查", Route::Colorblind),
            ("Colorblind check please", Route::Colorblind),
            ("我不满意", Route::Regenerate),
            ("not satisfied at all", Route::Regenerate),
            ("calm ocean blues", Route::Generate),
        ];
        for (text, expected) in cases {
            assert_eq!(route_for(text, &idle), expected, "{text}");
        }
    }

    #[test]
    fn test_first_trigger_wins() {
        let idle = SingleColorMode::default();
        assert_eq!(
            route_for("not satisfied, show history", &idle),
            Route::History
        );
        assert_eq!(
            route_for("colorblind check then contrast check", &idle),
            Route::Contrast
        );
    }

    #[test]
    fn test_single_color_mode_overrides_triggers() {
        let mode = SingleColorMode::select(&palette(&WARM), 1).unwrap();
        assert_eq!(route_for("show history", &mode), Route::SingleColor);

        let no_target = SingleColorMode {
            enabled: true,
            ..SingleColorMode::default()
        };
        assert_eq!(route_for("show history", &no_target), Route::History);
    }

    #[tokio::test]
    async fn test_send_prompt_rejects_blank() {
        let (_, mut orchestrator) = fixture();
        let err = orchestrator.send_prompt("  ").await.unwrap_err();
        assert!(matches!(
            err,
            ActionError::Validation(ValidationError::EmptyPrompt)
        ));
        assert!(orchestrator.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_send_prompt_generates_and_records_user_entry() {
        let (service, mut orchestrator) = fixture();
        service.push_palette(&WARM, 1, "");

        let route = orchestrator.send_prompt("autumn leaves").await.unwrap();
        assert_eq!(route, Route::Generate);
        assert_eq!(service.calls(), vec![Call::Generate("autumn leaves".to_string())]);

        let entries = orchestrator.transcript();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, Role::User);
        assert_eq!(entries[1].kind, EntryKind::Palette);
        // The new session snapshot already holds the prompt.
        assert_eq!(orchestrator.sessions()[0].messages.len(), 1);
    }

    #[tokio::test]
    async fn test_send_prompt_in_single_mode_uses_text_as_prompt() {
        let (service, mut orchestrator) = fixture();
        service.push_palette(&WARM, 1, "");
        service.push_palette(&COOL, 2, "");
        orchestrator.send_prompt("autumn").await.unwrap();
        orchestrator.select_color_for_edit(4).unwrap();

        let route = orchestrator.send_prompt("contrast check").await.unwrap();
        assert_eq!(route, Route::SingleColor);
        let Call::Single(request) = &service.calls()[1] else {
            panic!("expected a single-color call");
        };
        assert_eq!(request.prompt, "contrast check");
        assert_eq!(request.target_index, 4);
        assert_eq!(request.base_colors, palette(&WARM));
        assert!(!orchestrator.state().single_color.enabled);
        assert_eq!(orchestrator.state().palette, palette(&COOL));
    }

    #[tokio::test]
    async fn test_send_prompt_runs_analysis_without_service() {
        let (service, mut orchestrator) = fixture();
        orchestrator.state.palette = vec![
            HexColor::parse("#000").unwrap(),
            HexColor::parse("#fff").unwrap(),
        ];

        assert_eq!(
            orchestrator.send_prompt("contrast check").await.unwrap(),
            Route::Contrast
        );
        assert_eq!(
            orchestrator.send_prompt("colorblind check").await.unwrap(),
            Route::Colorblind
        );
        assert_eq!(
            orchestrator.send_prompt("show history").await.unwrap(),
            Route::History
        );
        assert!(service.calls().is_empty());
        assert_eq!(orchestrator.transcript().len(), 5);
    }
}
