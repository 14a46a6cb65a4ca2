//! Duration evaluators: how long each kind of action takes on a given element.
mod evaluator;

use std::sync::Arc;

use enum_map::EnumMap;
pub use evaluator::ConstantDuration;
pub use evaluator::DurationEvaluator;
pub use evaluator::DurationFromOptionalAttribute;
pub use evaluator::LinearToResourceDuration;

use crate::error::SchedulerError;
use crate::model::Element;
use crate::model::Model;
use crate::plan::ActionKind;

/// The registry mapping every kind of action to its [`DurationEvaluator`].
///
/// The default registry reads, for every kind, the attribute named after the action (see
/// [`ActionKind::attribute_key`]) and falls back to a duration of 1.
#[derive(Clone, Debug)]
pub struct DurationEvaluators {
    evaluators: EnumMap<ActionKind, Option<Arc<dyn DurationEvaluator>>>,
}

impl Default for DurationEvaluators {
    fn default() -> Self {
        let mut evaluators = DurationEvaluators::empty();
        for (kind, evaluator) in evaluators.evaluators.iter_mut() {
            *evaluator = Some(Arc::new(DurationFromOptionalAttribute::new(
                kind.attribute_key(),
                ConstantDuration(1),
            )));
        }
        evaluators
    }
}

impl DurationEvaluators {
    /// A registry without any evaluator.
    pub fn empty() -> DurationEvaluators {
        DurationEvaluators {
            evaluators: EnumMap::default(),
        }
    }

    /// Registers the evaluator of `kind`; returns whether one was registered before.
    pub fn register(
        &mut self,
        kind: ActionKind,
        evaluator: impl DurationEvaluator + 'static,
    ) -> bool {
        self.evaluators[kind].replace(Arc::new(evaluator)).is_some()
    }

    /// Removes the evaluator of `kind`; returns whether there was one.
    pub fn unregister(&mut self, kind: ActionKind) -> bool {
        self.evaluators[kind].take().is_some()
    }

    pub fn is_registered(&self, kind: ActionKind) -> bool {
        self.evaluators[kind].is_some()
    }

    /// The duration of the action `kind` on `element`, which is strictly positive.
    pub fn evaluate(
        &self,
        model: &Model,
        kind: ActionKind,
        element: impl Into<Element>,
    ) -> Result<i32, SchedulerError> {
        let element = element.into();
        let evaluator = self.evaluators[kind]
            .as_ref()
            .ok_or(SchedulerError::MissingDurationEvaluator(kind))?;

        let duration = evaluator.evaluate(model, element)?;
        if duration <= 0 {
            return Err(SchedulerError::NonPositiveDuration {
                kind,
                element,
                duration,
            });
        }

        Ok(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_default_bundle_covers_every_kind() {
        let mut model = Model::default();
        let vm = model.new_vm();
        let evaluators = DurationEvaluators::default();

        assert!(evaluators.is_registered(ActionKind::MigrateVm));
        assert!(evaluators.is_registered(ActionKind::BootNode));
        assert_eq!(Ok(1), evaluators.evaluate(&model, ActionKind::ShutdownVm, vm));

        let _ = model.attributes_mut().put(vm, "shutdown", 5);
        assert_eq!(Ok(5), evaluators.evaluate(&model, ActionKind::ShutdownVm, vm));
    }

    #[test]
    fn missing_and_non_positive_durations_are_errors() {
        let mut model = Model::default();
        let vm = model.new_vm();
        let mut evaluators = DurationEvaluators::default();

        assert!(evaluators.unregister(ActionKind::KillVm));
        assert_eq!(
            Err(SchedulerError::MissingDurationEvaluator(ActionKind::KillVm)),
            evaluators.evaluate(&model, ActionKind::KillVm, vm)
        );

        assert!(evaluators.register(ActionKind::MigrateVm, ConstantDuration(0)));
        assert_eq!(
            Err(SchedulerError::NonPositiveDuration {
                kind: ActionKind::MigrateVm,
                element: Element::Vm(vm),
                duration: 0,
            }),
            evaluators.evaluate(&model, ActionKind::MigrateVm, vm)
        );

        let _ = model.attributes_mut().put(vm, "boot", -2);
        assert!(evaluators.evaluate(&model, ActionKind::BootVm, vm).is_err());
    }
}
