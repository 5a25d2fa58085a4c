use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A sequential phase of the surgery unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Preparation,
    OperatingRoom,
    Recovery,
}

impl Stage {
    /// All stages in patient order
    pub const ALL: [Stage; 3] = [Stage::Preparation, Stage::OperatingRoom, Stage::Recovery];

    pub fn index(self) -> usize {
        match self {
            Stage::Preparation => 0,
            Stage::OperatingRoom => 1,
            Stage::Recovery => 2,
        }
    }

    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Preparation => Some(Stage::OperatingRoom),
            Stage::OperatingRoom => Some(Stage::Recovery),
            Stage::Recovery => None,
        }
    }

    pub fn previous(self) -> Option<Stage> {
        match self {
            Stage::Preparation => None,
            Stage::OperatingRoom => Some(Stage::Preparation),
            Stage::Recovery => Some(Stage::OperatingRoom),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Preparation => "prep",
            Stage::OperatingRoom => "or",
            Stage::Recovery => "recovery",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One value per stage, indexable by [`Stage`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerStage<T> {
    pub preparation: T,
    pub operating_room: T,
    pub recovery: T,
}

impl<T> PerStage<T> {
    pub fn from_fn(mut f: impl FnMut(Stage) -> T) -> Self {
        Self {
            preparation: f(Stage::Preparation),
            operating_room: f(Stage::OperatingRoom),
            recovery: f(Stage::Recovery),
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Stage, &T) -> U) -> PerStage<U> {
        PerStage::from_fn(|stage| f(stage, &self[stage]))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stage, &T)> {
        Stage::ALL.into_iter().map(move |stage| (stage, &self[stage]))
    }
}

impl<T> Index<Stage> for PerStage<T> {
    type Output = T;

    fn index(&self, stage: Stage) -> &T {
        match stage {
            Stage::Preparation => &self.preparation,
            Stage::OperatingRoom => &self.operating_room,
            Stage::Recovery => &self.recovery,
        }
    }
}

impl<T> IndexMut<Stage> for PerStage<T> {
    fn index_mut(&mut self, stage: Stage) -> &mut T {
        match stage {
            Stage::Preparation => &mut self.preparation,
            Stage::OperatingRoom => &mut self.operating_room,
            Stage::Recovery => &mut self.recovery,
        }
    }
}
