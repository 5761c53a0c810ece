use crate::error::ProvisionError;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// A deployment step, its prerequisites and whether it runs after every other step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDescriptor {
    pub tag: &'static str,
    pub dependencies: &'static [&'static str],
    pub run_at_the_end: bool,
}

impl StepDescriptor {
    /// Fail with the first dependency absent from `provided`.
    pub fn check_dependencies(&self, provided: &HashSet<&str>) -> Result<(), ProvisionError> {
        match self.dependencies.iter().find(|dependency| !provided.contains(*dependency)) {
            Some(dependency) => Err(ProvisionError::MissingDependency { step: self.tag.to_string(), dependency: dependency.to_string() }),
            None => Ok(()),
        }
    }
}

/// Market creation and configuration.
pub const MARKETS_STEP: StepDescriptor =
    StepDescriptor { tag: "Markets", dependencies: &["MarketFactory", "Tokens", "DataStore"], run_at_the_end: true };

/// Verify that `MARKETS_STEP` can run with the components in `provided`.
pub fn check_dependencies(provided: &HashSet<&str>) -> Result<(), ProvisionError> {
    MARKETS_STEP.check_dependencies(provided)
}

/// Order steps so every step follows its dependencies, with run-at-the-end steps last.
///
/// A dependency is satisfied either by another step in `steps` or by a name in `provided`.
/// Ties keep the input order.
pub fn order_steps(steps: &[StepDescriptor], provided: &HashSet<&str>) -> Result<Vec<StepDescriptor>, ProvisionError> {
    let tags: HashSet<&str> = steps.iter().map(|step| step.tag).collect();
    for step in steps {
        for dependency in step.dependencies {
            if !tags.contains(dependency) && !provided.contains(dependency) {
                return Err(ProvisionError::MissingDependency { step: step.tag.to_string(), dependency: dependency.to_string() });
            }
        }
    }

    // in-degree counts only dependencies produced by other steps
    let mut in_degree: BTreeMap<usize, usize> = steps
        .iter()
        .enumerate()
        .map(|(i, step)| (i, step.dependencies.iter().filter(|dependency| tags.contains(*dependency)).count()))
        .collect();

    let mut ordered: Vec<StepDescriptor> = Vec::with_capacity(steps.len());
    while ordered.len() < steps.len() {
        // regular steps before run-at-the-end ones, then input order
        let next = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(i, _)| *i)
            .min_by_key(|i| (steps[*i].run_at_the_end, *i));

        let Some(index) = next else {
            let remaining: Vec<&str> = in_degree.keys().map(|i| steps[*i].tag).collect();
            return Err(ProvisionError::DependencyCycle(remaining.join(", ")));
        };

        in_degree.remove(&index);
        let step = steps[index];
        for (i, degree) in in_degree.iter_mut() {
            if steps[*i].dependencies.contains(&step.tag) {
                *degree -= 1;
            }
        }
        debug!("step {} scheduled at position {}", step.tag, ordered.len());
        ordered.push(step);
    }

    Ok(ordered)
}
