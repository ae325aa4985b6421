//! # Editing Session
//!
//! A [`Session`] owns everything one model preparation needs: the primitive
//! registry, the interaction set, the current groups and selection, and the
//! stage flags that decide which operation may run next.
//!
//! ## Stages
//!
//! ```text
//! Imported → Cleaned → InteractionsBuilt → Grouped → Joined → Exported
//! ```
//!
//! Operations invoked out of order are refused with
//! [`MolPrintError::PreconditionNotMet`] before anything is mutated.
//!
//! ## Example
//!
//! ```rust
//! use molprint_core::{PipelineStage, Session};
//! use glam::DVec3;
//!
//! let mut session = Session::default();
//! session.import_sphere(None, DVec3::ZERO, 0.6).unwrap();
//! assert_eq!(session.stage(), PipelineStage::Imported);
//!
//! session.clean().unwrap();
//! assert_eq!(session.stage(), PipelineStage::InteractionsBuilt);
//! ```

use crate::error::{Diagnostic, MolPrintError, MolPrintResult};
use crate::grouping::Group;
use crate::interaction::Interaction;
use crate::kernel::{GeometryKernel, MeshKernel};
use crate::orient::FloorPreview;
use crate::primitive::{Primitive, PrimitiveId, Registry};
use crate::settings::Settings;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

/// Position of a session in the preparation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Imported,
    Cleaned,
    InteractionsBuilt,
    Grouped,
    Joined,
    Exported,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Imported => "imported",
            Self::Cleaned => "cleaned",
            Self::InteractionsBuilt => "interactions built",
            Self::Grouped => "grouped",
            Self::Joined => "joined",
            Self::Exported => "exported",
        };
        f.write_str(name)
    }
}

/// Coarse flags recording which stages have completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageFlags {
    pub cleaned: bool,
    pub interactions_computed: bool,
    pub groups_joined: bool,
    /// Set by the CPK split, whose parts are final like joined parts
    pub cpk_split: bool,
    pub exported: bool,
}

/// State of one model preparation.
pub struct Session<K: GeometryKernel = MeshKernel> {
    pub(crate) kernel: K,
    pub(crate) settings: Settings,
    pub(crate) registry: Registry,
    pub(crate) interactions: Vec<Interaction>,
    pub(crate) groups: Vec<Group>,
    pub(crate) selection: Vec<PrimitiveId>,
    /// Selection seen by the last regroup
    pub(crate) observed_selection: Vec<PrimitiveId>,
    pub(crate) flags: StageFlags,
    pub(crate) floor_preview: Option<FloorPreview>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl Default for Session<MeshKernel> {
    fn default() -> Self {
        Self::with_kernel(MeshKernel, Settings::default())
    }
}

impl Session<MeshKernel> {
    /// Creates a session on the in-tree kernel.
    pub fn new(settings: Settings) -> MolPrintResult<Self> {
        settings.validate()?;
        Ok(Self::with_kernel(MeshKernel, settings))
    }
}

impl<K: GeometryKernel> Session<K> {
    /// Creates a session on a caller-supplied kernel.
    ///
    /// Settings are taken as given; use [`Settings::validate`] first when
    /// they come from outside.
    pub fn with_kernel(kernel: K, settings: Settings) -> Self {
        Self {
            kernel,
            settings,
            registry: Registry::new(),
            interactions: Vec::new(),
            groups: Vec::new(),
            selection: Vec::new(),
            observed_selection: Vec::new(),
            flags: StageFlags::default(),
            floor_preview: None,
            diagnostics: Vec::new(),
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces the settings after validating them.
    pub fn set_settings(&mut self, settings: Settings) -> MolPrintResult<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn primitive(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.registry.get(id)
    }

    pub fn primitive_mut(&mut self, id: PrimitiveId) -> Option<&mut Primitive> {
        self.registry.get_mut(id)
    }

    /// Current interaction set, sphere first in every entry.
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn selection(&self) -> &[PrimitiveId] {
        &self.selection
    }

    pub fn flags(&self) -> StageFlags {
        self.flags
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns and clears the recorded diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// The furthest stage the session has reached.
    pub fn stage(&self) -> PipelineStage {
        let flags = self.flags;
        if flags.exported {
            PipelineStage::Exported
        } else if flags.groups_joined || flags.cpk_split {
            PipelineStage::Joined
        } else if flags.interactions_computed && !self.groups.is_empty() {
            PipelineStage::Grouped
        } else if flags.interactions_computed {
            PipelineStage::InteractionsBuilt
        } else if flags.cleaned {
            PipelineStage::Cleaned
        } else {
            PipelineStage::Imported
        }
    }

    // =========================================================================
    // SELECTION
    // =========================================================================

    /// Entry point for hosts whenever the user's selection changes.
    ///
    /// Duplicate ids are dropped, keeping first occurrences. When
    /// interactions are built, auto-grouping is on and the selection differs
    /// from the one last observed, the groups are recomputed. Returns true if
    /// they were.
    pub fn on_selection_changed(
        &mut self,
        selection: impl IntoIterator<Item = PrimitiveId>,
    ) -> MolPrintResult<bool> {
        let mut seen = HashSet::new();
        let mut deduped = Vec::new();
        for id in selection {
            self.registry.require(id)?;
            if seen.insert(id) {
                deduped.push(id);
            }
        }
        self.selection = deduped;
        self.regroup_if_changed()
    }

    /// Adds ids to the current selection and notifies the selection hook.
    pub fn extend_selection(
        &mut self,
        ids: impl IntoIterator<Item = PrimitiveId>,
    ) -> MolPrintResult<bool> {
        let mut selection = self.selection.clone();
        selection.extend(ids);
        self.on_selection_changed(selection)
    }

    /// Selects every live primitive.
    pub fn select_all(&mut self) -> MolPrintResult<bool> {
        let ids = self.registry.ids();
        self.on_selection_changed(ids)
    }

    pub fn clear_selection(&mut self) -> MolPrintResult<bool> {
        self.on_selection_changed(Vec::new())
    }

    fn regroup_if_changed(&mut self) -> MolPrintResult<bool> {
        if !(self.flags.interactions_computed && self.settings.autogroup) {
            return Ok(false);
        }
        if self.selection == self.observed_selection {
            return Ok(false);
        }
        self.update_groups()?;
        Ok(true)
    }

    // =========================================================================
    // INTERNAL HELPERS
    // =========================================================================

    /// Records a recoverable failure.
    pub(crate) fn record(&mut self, operation: &'static str, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(operation, message);
        warn!(operation, message = %diagnostic.message, "Recoverable failure");
        self.diagnostics.push(diagnostic);
    }

    /// Refuses the operation unless interactions are current.
    pub(crate) fn require_interactions(&self, operation: &'static str) -> MolPrintResult<()> {
        if self.flags.interactions_computed {
            Ok(())
        } else {
            Err(MolPrintError::precondition(
                operation,
                "interactions have not been built",
            ))
        }
    }

    /// Drops interactions and groups after the topology changed.
    pub(crate) fn invalidate_interactions(&mut self) {
        self.interactions.clear();
        self.groups.clear();
        self.observed_selection.clear();
        self.flags.interactions_computed = false;
    }

    /// Removes a primitive and every selection or preview reference to it.
    pub(crate) fn remove_primitive(&mut self, id: PrimitiveId) -> Option<Primitive> {
        let removed = self.registry.remove(id);
        if removed.is_some() {
            self.selection.retain(|&s| s != id);
            self.observed_selection.retain(|&s| s != id);
            if self
                .floor_preview
                .as_ref()
                .is_some_and(|preview| preview.target == id)
            {
                debug!(%id, "Discarding floor preview of removed primitive");
                self.floor_preview = None;
            }
        }
        removed
    }
}

impl<K: GeometryKernel> fmt::Debug for Session<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("primitives", &self.registry.len())
            .field("interactions", &self.interactions.len())
            .field("groups", &self.groups.len())
            .field("selection", &self.selection)
            .field("flags", &self.flags)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn test_new_session_is_imported() {
        let session = Session::default();
        assert_eq!(session.stage(), PipelineStage::Imported);
        assert!(session.registry().is_empty());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = Settings {
            max_hbond: 3.0,
            ..Settings::default()
        };
        assert!(matches!(
            Session::new(settings),
            Err(MolPrintError::InvalidSettings { .. })
        ));
    }

    #[test]
    fn test_selection_dedupes_and_checks_ids() {
        let mut session = Session::default();
        let a = session.import_sphere(None, DVec3::ZERO, 0.6).unwrap();
        let b = session.import_sphere(None, DVec3::X * 5.0, 0.6).unwrap();

        session.on_selection_changed([b, a, b]).unwrap();
        assert_eq!(session.selection(), &[b, a]);

        let err = session.on_selection_changed([PrimitiveId(99)]).unwrap_err();
        assert_eq!(err, MolPrintError::UnknownPrimitive(PrimitiveId(99)));
        assert_eq!(session.selection(), &[b, a]);
    }

    #[test]
    fn test_selection_before_interactions_does_not_group() {
        let mut session = Session::default();
        let a = session.import_sphere(None, DVec3::ZERO, 0.6).unwrap();
        assert!(!session.on_selection_changed([a]).unwrap());
        assert!(session.groups().is_empty());
    }

    #[test]
    fn test_selection_hook_regroups_once_per_change() {
        let mut session = Session::default();
        let a = session.import_sphere(None, DVec3::ZERO, 0.6).unwrap();
        session.clean().unwrap();

        assert!(session.on_selection_changed([a]).unwrap());
        assert_eq!(session.stage(), PipelineStage::Grouped);
        assert!(!session.on_selection_changed([a]).unwrap());
    }

    #[test]
    fn test_autogroup_off_skips_regroup() {
        let settings = Settings {
            autogroup: false,
            ..Settings::default()
        };
        let mut session = Session::new(settings).unwrap();
        let a = session.import_sphere(None, DVec3::ZERO, 0.6).unwrap();
        session.clean().unwrap();

        assert!(!session.on_selection_changed([a]).unwrap());
        assert!(session.groups().is_empty());
    }

    #[test]
    fn test_take_diagnostics_clears() {
        let mut session = Session::default();
        session.record("test", "something recoverable");
        assert_eq!(session.take_diagnostics().len(), 1);
        assert!(session.diagnostics().is_empty());
    }
}
