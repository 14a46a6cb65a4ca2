use std::fmt::Debug;
use std::sync::Arc;

use crate::error::SchedulerError;
use crate::model::Element;
use crate::model::Model;
use crate::model::ResourceView;

/// Estimates how long an action takes on a given element.
pub trait DurationEvaluator: Debug + Send + Sync {
    fn evaluate(&self, model: &Model, element: Element) -> Result<i32, SchedulerError>;
}

/// The same duration for every element.
#[derive(Clone, Copy, Debug)]
pub struct ConstantDuration(pub i32);

impl DurationEvaluator for ConstantDuration {
    fn evaluate(&self, _model: &Model, _element: Element) -> Result<i32, SchedulerError> {
        Ok(self.0)
    }
}

/// Reads the duration from an attribute of the element, and defers to a fallback evaluator for
/// the elements without that attribute.
#[derive(Clone, Debug)]
pub struct DurationFromOptionalAttribute {
    key: String,
    fallback: Arc<dyn DurationEvaluator>,
}

impl DurationFromOptionalAttribute {
    pub fn new(
        key: impl Into<String>,
        fallback: impl DurationEvaluator + 'static,
    ) -> DurationFromOptionalAttribute {
        DurationFromOptionalAttribute {
            key: key.into(),
            fallback: Arc::new(fallback),
        }
    }
}

impl DurationEvaluator for DurationFromOptionalAttribute {
    fn evaluate(&self, model: &Model, element: Element) -> Result<i32, SchedulerError> {
        match model.attributes().get(element, &self.key) {
            Some(duration) => Ok(duration),
            None => self.fallback.evaluate(model, element),
        }
    }
}

/// `a * amount + b`, where the amount is the consumption of a VM or the capacity of a node for
/// one resource.
#[derive(Clone, Debug)]
pub struct LinearToResourceDuration {
    resource: String,
    a: i32,
    b: i32,
}

impl LinearToResourceDuration {
    pub fn new(resource: impl Into<String>, a: i32, b: i32) -> LinearToResourceDuration {
        LinearToResourceDuration {
            resource: resource.into(),
            a,
            b,
        }
    }
}

impl DurationEvaluator for LinearToResourceDuration {
    fn evaluate(&self, model: &Model, element: Element) -> Result<i32, SchedulerError> {
        let resource = model
            .resource(&self.resource)
            .ok_or_else(|| SchedulerError::UnknownResource(self.resource.clone()))?;

        let amount = match element {
            Element::Vm(vm) => resource.consumption(vm),
            Element::Node(node) => resource.capacity(node),
        };

        self.a
            .checked_mul(amount)
            .and_then(|scaled| scaled.checked_add(self.b))
            .ok_or(SchedulerError::DurationOverflow(element))
    }
}
