//! User actions layered on the orchestrator: analysis commands, regenerate,
//! swatch selection.

use tracing::info;

use crate::color::analysis::{ColorblindReport, ContrastReport, colorblind_report, contrast_report};
use crate::color::science::HexColor;
use crate::engine::notice::NoticeLevel;
use crate::engine::orchestrator::{Orchestrator, Transition};
use crate::session::errors::{ActionResult, ValidationError};
use crate::session::model::{ChatEntry, SessionSummary};
use crate::session::state::SingleColorMode;

impl Orchestrator {
    /// Open the saved-session listing.
    pub fn show_history(&mut self) -> Vec<SessionSummary> {
        let summaries = self.session_summaries();
        self.notify(
            NoticeLevel::Info,
            format!("{} saved sessions", summaries.len()),
        );
        summaries
    }

    /// Pairwise WCAG contrast of the active palette.
    ///
    /// # Errors
    /// Returns a validation error when fewer than two colors are active.
    pub async fn contrast_check(&mut self) -> ActionResult<ContrastReport> {
        let Some(report) = contrast_report(&self.state.palette) else {
            return Err(self.reject(
                NoticeLevel::Warning,
                "Not enough colors for a contrast check",
                ValidationError::NotEnoughColors,
            ));
        };
        info!(
            "Contrast check: {}/{} pairs pass, weakest {:.2}",
            report.pass_count, report.total_pairs, report.min_ratio
        );
        self.append(ChatEntry::assistant_contrast(report.clone())).await;
        Ok(report)
    }

    /// Color-vision-deficiency simulation of the active palette.
    ///
    /// # Errors
    /// Returns a validation error when the active palette is empty.
    pub async fn colorblind_check(&mut self) -> ActionResult<ColorblindReport> {
        let Some(report) = colorblind_report(&self.state.palette) else {
            return Err(self.reject(
                NoticeLevel::Warning,
                "Generate a palette first",
                ValidationError::NoPalette,
            ));
        };
        info!(
            "Colorblind check: min contrast {:.2}, accessible {}",
            report.min_contrast, report.is_accessible
        );
        self.append(ChatEntry::assistant_colorblind(report.clone())).await;
        Ok(report)
    }

    /// Ask again with the current palette marked as unsatisfying.
    ///
    /// # Errors
    /// Returns a validation error when no palette is active, otherwise whatever
    /// [`generate`](Self::generate) returns.
    pub async fn regenerate(&mut self) -> ActionResult<Transition> {
        if self.state.palette.is_empty() {
            return Err(self.reject(
                NoticeLevel::Warning,
                "Generate a palette first",
                ValidationError::NoPalette,
            ));
        }
        let prompt = regenerate_prompt(&self.state.palette, &self.state.prompt);
        self.append(ChatEntry::user_text(prompt.clone())).await;
        self.generate(&prompt).await
    }

    /// Enter single-color editing for `palette[index]`.
    ///
    /// # Errors
    /// Returns a validation error when no palette is active or the index is
    /// out of range.
    pub fn select_color_for_edit(&mut self, index: usize) -> ActionResult<HexColor> {
        let len = self.state.palette.len();
        if len == 0 {
            return Err(self.reject(
                NoticeLevel::Error,
                "There is no palette to choose from",
                ValidationError::NoPalette,
            ));
        }
        let Some(mode) = SingleColorMode::select(&self.state.palette, index) else {
            return Err(self.reject(
                NoticeLevel::Error,
                "Invalid color index",
                ValidationError::IndexOutOfRange { index, len },
            ));
        };

        let Some(target) = mode.target_hex.clone() else {
            return Err(ValidationError::NoTargetColor.into());
        };
        self.state.single_color = mode;
        self.notify(
            NoticeLevel::Info,
            format!("Selected {target}, describe the change you want"),
        );
        Ok(target)
    }

    /// Current color at `index`, used as the picker default.
    #[must_use]
    pub fn pick_color(&self, index: usize) -> Option<&HexColor> {
        self.state.palette.get(index)
    }
}

/// Prompt sent when the user rejects the current palette.
#[must_use]
pub fn regenerate_prompt(colors: &[HexColor], prompt: &str) -> String {
    let listed = colors
        .iter()
        .map(HexColor::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!("Not satisfied with {listed}; regenerate the palette following: {prompt}")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::color::science::ContrastLevel;
    use crate::engine::orchestrator::TITLE_REFINED;
    use crate::service::fake::{COOL, Call, ScriptedService, WARM, palette};
    use crate::session::config::PaletteConfig;
    use crate::session::errors::ActionError;
    use crate::session::model::{EntryKind, EntryPayload, Role};
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

    #[tokio::test]
    async fn test_contrast_check_appends_full_matrix() {
        let (_, mut orchestrator) = fixture();
        orchestrator.state.palette = palette(&["#000000", "#FFFFFF", "#777777"]);

        let report = orchestrator.contrast_check().await.unwrap();
        assert_eq!(report.total_pairs, 3);
        let worst = report.worst().unwrap();
        assert!((worst.ratio - report.min_ratio).abs() < f64::EPSILON);
        assert_eq!(report.results.last().map(|p| p.level), Some(ContrastLevel::Aaa));
        assert!(report.results.windows(2).all(|w| w[0].ratio <= w[1].ratio));

        let entry = orchestrator.transcript().last().unwrap();
        assert_eq!(entry.kind, EntryKind::Contrast);
        let Some(EntryPayload::Contrast(stored)) = &entry.payload else {
            panic!("expected a contrast payload");
        };
        assert_eq!(stored.results.len(), 3);
    }

    #[tokio::test]
    async fn test_contrast_check_needs_two_colors() {
        let (_, mut orchestrator) = fixture();
        orchestrator.state.palette = palette(&["#000000"]);
        let err = orchestrator.contrast_check().await.unwrap_err();
        assert!(matches!(
            err,
            ActionError::Validation(ValidationError::NotEnoughColors)
        ));
        assert!(orchestrator.transcript().is_empty());
        assert_eq!(orchestrator.notices()[0].level, NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn test_colorblind_check_reports_all_variants() {
        let (_, mut orchestrator) = fixture();
        orchestrator.state.palette = palette(&WARM);

        let report = orchestrator.colorblind_check().await.unwrap();
        assert_eq!(report.deuteranopia.len(), 5);
        assert_eq!(report.achromatopsia.len(), 5);
        assert!(!report.recommendations.is_empty());
        assert_eq!(
            orchestrator.transcript().last().map(|e| e.kind),
            Some(EntryKind::Colorblind)
        );
    }

    #[tokio::test]
    async fn test_colorblind_check_needs_a_palette() {
        let (_, mut orchestrator) = fixture();
        orchestrator.state.palette.clear();
        assert!(orchestrator.colorblind_check().await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_regenerate_sends_dissatisfaction_prompt() {
        let (service, mut orchestrator) = fixture();
        service.push_palette(&WARM, 1, "");
        service.push_palette(&COOL, 2, "");
        orchestrator.generate("forest").await.unwrap();

        let transition = orchestrator.regenerate().await.unwrap();
        assert!(matches!(transition, Transition::Refined(_)));

        let expected = format!(
            "Not satisfied with {}; regenerate the palette following: forest",
            WARM.join(", ")
        );
        assert_eq!(
            service.calls()[1],
            Call::Refine(palette(&WARM), expected.clone())
        );
        let user = orchestrator
            .transcript()
            .iter()
            .rev()
            .find(|e| e.role == Role::User)
            .unwrap();
        assert_eq!(user.content.as_deref(), Some(expected.as_str()));
        let Some(EntryPayload::Palette(card)) = &orchestrator.transcript().last().unwrap().payload
        else {
            panic!("expected a palette card");
        };
        assert_eq!(card.title, TITLE_REFINED);
    }

    #[tokio::test]
    async fn test_regenerate_without_palette_is_rejected() {
        let (service, mut orchestrator) = fixture();
        orchestrator.state.palette.clear();
        assert!(orchestrator.regenerate().await.unwrap_err().is_validation());
        assert!(service.calls().is_empty());
        assert!(orchestrator.transcript().is_empty());
    }

    #[test]
    fn test_select_color_enters_single_mode() {
        let (_, mut orchestrator) = fixture();
        orchestrator.state.palette = palette(&COOL);

        let target = orchestrator.select_color_for_edit(3).unwrap();
        assert_eq!(target.as_str(), COOL[3]);
        let mode = &orchestrator.state().single_color;
        assert!(mode.enabled);
        assert_eq!(mode.target_index, Some(3));
        assert_eq!(mode.base_palette, palette(&COOL));
        assert!(mode.pending_prompt.is_empty());
        assert_eq!(orchestrator.notices()[0].level, NoticeLevel::Info);
    }

    #[test]
    fn test_select_color_validates() {
        let (_, mut orchestrator) = fixture();
        let err = orchestrator.select_color_for_edit(9).unwrap_err();
        assert!(matches!(
            err,
            ActionError::Validation(ValidationError::IndexOutOfRange { index: 9, len: 5 })
        ));

        orchestrator.state.palette.clear();
        let err = orchestrator.select_color_for_edit(0).unwrap_err();
        assert!(matches!(err, ActionError::Validation(ValidationError::NoPalette)));
        assert!(!orchestrator.state().single_color.enabled);
    }

    #[test]
    fn test_pick_color() {
        let (_, mut orchestrator) = fixture();
        orchestrator.state.palette = palette(&WARM);
        assert_eq!(orchestrator.pick_color(0).map(HexColor::as_str), Some(WARM[0]));
        assert!(orchestrator.pick_color(5).is_none());
    }
}
