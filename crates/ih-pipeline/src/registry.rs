//! Name → action lookup.
//!
//! The registry is assembled once through [`RegistryBuilder`] and frozen; a
//! built [`ActionRegistry`] has no mutating methods and is shared behind an
//! `Arc` without locks.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::action::ImageAction;
use crate::actions::{
    BlurAction, BrightAction, CircleAction, ContrastAction, CropAction, FormatAction, GreyAction,
    IndexCropAction, InfoAction, QualityAction, ResizeAction, RotateAction, RoundedCornersAction,
    SharpenAction, WatermarkAction,
};

/// Every action the handler ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinAction {
    Quality,
    Resize,
    Crop,
    Format,
    Circle,
    IndexCrop,
    RoundedCorners,
    Blur,
    Rotate,
    Bright,
    Contrast,
    Sharpen,
    Grey,
    Watermark,
    Info,
}

impl BuiltinAction {
    pub const ALL: [BuiltinAction; 15] = [
        Self::Quality,
        Self::Resize,
        Self::Crop,
        Self::Format,
        Self::Circle,
        Self::IndexCrop,
        Self::RoundedCorners,
        Self::Blur,
        Self::Rotate,
        Self::Bright,
        Self::Contrast,
        Self::Sharpen,
        Self::Grey,
        Self::Watermark,
        Self::Info,
    ];

    pub fn instantiate(self) -> Arc<dyn ImageAction> {
        match self {
            Self::Quality => Arc::new(QualityAction),
            Self::Resize => Arc::new(ResizeAction),
            Self::Crop => Arc::new(CropAction),
            Self::Format => Arc::new(FormatAction),
            Self::Circle => Arc::new(CircleAction),
            Self::IndexCrop => Arc::new(IndexCropAction),
            Self::RoundedCorners => Arc::new(RoundedCornersAction),
            Self::Blur => Arc::new(BlurAction),
            Self::Rotate => Arc::new(RotateAction),
            Self::Bright => Arc::new(BrightAction),
            Self::Contrast => Arc::new(ContrastAction),
            Self::Sharpen => Arc::new(SharpenAction),
            Self::Grey => Arc::new(GreyAction),
            Self::Watermark => Arc::new(WatermarkAction),
            Self::Info => Arc::new(InfoAction),
        }
    }
}

/// Collects actions before freezing them into an [`ActionRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    actions: BTreeMap<&'static str, Arc<dyn ImageAction>>,
}

impl RegistryBuilder {
    /// Add an action. The first registration of a name wins; later ones are
    /// ignored.
    pub fn register<A: ImageAction + 'static>(self, action: A) -> Self {
        self.register_arc(Arc::new(action))
    }

    pub fn register_arc(mut self, action: Arc<dyn ImageAction>) -> Self {
        let name = action.name();
        if self.actions.contains_key(name) {
            tracing::debug!("Action {name} already registered; ignoring duplicate");
        } else {
            self.actions.insert(name, action);
        }
        self
    }

    pub fn build(self) -> ActionRegistry {
        ActionRegistry {
            actions: self.actions,
        }
    }
}

/// Frozen set of actions keyed by directive name.
pub struct ActionRegistry {
    actions: BTreeMap<&'static str, Arc<dyn ImageAction>>,
}

impl ActionRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry holding every [`BuiltinAction`].
    pub fn builtin() -> Self {
        BuiltinAction::ALL
            .into_iter()
            .fold(Self::builder(), |b, a| b.register_arc(a.instantiate()))
            .build()
    }

    pub fn resolve(&self, name: &str) -> Option<&Arc<dyn ImageAction>> {
        self.actions.get(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&'static str> {
        self.actions.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}
