//! Static configuration validation.
//!
//! Walks the constructor graph of a configuration without constructing
//! anything, reporting unresolvable parameters and dependency cycles before the
//! first resolution would hit them. Factories and instances are opaque and
//! contribute no edges.

use std::collections::HashSet;
use std::fmt;

use ahash::AHashMap;

use crate::error::DiError;
use crate::internal::Identity;
use crate::key::ServiceKey;
use crate::lifetime::Lifecycle;
use crate::registration::{Activation, Registry};

/// Outcome of [`DependencyConfiguration::validate`](crate::DependencyConfiguration::validate).
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Problems that make some resolution fail
    pub errors: Vec<ValidationError>,
    /// Configurations that resolve but are probably unintended
    pub warnings: Vec<ValidationWarning>,
}

/// A configuration problem that makes resolution fail.
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// A constructor parameter has no matching record
    MissingDependency {
        service: &'static str,
        dependency: &'static str,
        key: Option<ServiceKey>,
    },
    /// Constructing one of the types requires constructing itself
    CircularDependency { cycle: Vec<&'static str> },
    /// A parameter matched a record that cannot be activated
    InvalidRegistration {
        service: &'static str,
        error: DiError,
    },
}

/// A configuration that resolves but is probably unintended.
#[derive(Debug, Clone)]
pub enum ValidationWarning {
    /// A singleton captures one instance of a per-dependency service forever
    SingletonDependsOnPerDependency {
        singleton: &'static str,
        dependency: &'static str,
    },
}

impl ValidationResult {
    /// Returns true if validation passed without errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Formats errors and warnings for display.
    pub fn format_issues(&self) -> String {
        let mut output = String::new();

        if !self.errors.is_empty() {
            output.push_str("Validation Errors:\n");
            for error in &self.errors {
                output.push_str(&format!("  - {}\n", error));
            }
        }

        if !self.warnings.is_empty() {
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str("Validation Warnings:\n");
            for warning in &self.warnings {
                output.push_str(&format!("  - {}\n", warning));
            }
        }

        output
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingDependency {
                service,
                dependency,
                key: Some(key),
            } => write!(f, "'{}' depends on unregistered '{}' [{}]", service, dependency, key),
            ValidationError::MissingDependency { service, dependency, key: None } => {
                write!(f, "'{}' depends on unregistered '{}'", service, dependency)
            }
            ValidationError::CircularDependency { cycle } => {
                write!(f, "Circular dependency detected: {}", cycle.join(" -> "))
            }
            ValidationError::InvalidRegistration { service, error } => {
                write!(f, "'{}' has an unusable dependency: {}", service, error)
            }
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::SingletonDependsOnPerDependency { singleton, dependency } => write!(
                f,
                "Singleton '{}' depends on per-dependency '{}' and will keep a single instance of it",
                singleton, dependency
            ),
        }
    }
}

struct Node {
    name: &'static str,
    edges: Vec<Identity>,
}

pub(crate) fn validate(registry: &Registry) -> ValidationResult {
    let mut result = ValidationResult::default();
    let mut nodes: AHashMap<Identity, Node> = AHashMap::new();
    let mut order: Vec<Identity> = Vec::new();

    let mut pending: Vec<(Lifecycle, Activation)> = Vec::new();
    for record in registry.iter() {
        if record.is_open() {
            continue;
        }
        match record.activate(&record.service) {
            Ok(Some(activation)) => pending.push((record.lifecycle, activation)),
            Ok(None) => {}
            Err(error) => result.errors.push(ValidationError::InvalidRegistration {
                service: record.service.name(),
                error,
            }),
        }
    }
    // Visit in registration order
    pending.reverse();

    while let Some((lifecycle, activation)) = pending.pop() {
        let implementation = &activation.implementation;
        let frame = implementation.frame();
        if nodes.contains_key(&frame.identity()) {
            continue;
        }

        if let Err(error) = implementation.check() {
            result.errors.push(ValidationError::InvalidRegistration {
                service: implementation.service().name(),
                error,
            });
        }

        let mut edges = Vec::new();
        for parameter in implementation.parameters() {
            let targets = match parameter.service().element() {
                Some(_) if parameter.key().is_some() => {
                    Err(DiError::KeyedSequence(parameter.service().name()))
                }
                Some(element) => registry
                    .select_all(element)
                    .map(|all| all.into_iter().map(|(r, a)| (r.lifecycle, a)).collect::<Vec<_>>()),
                None => registry
                    .select(parameter.service(), parameter.key())
                    .map(|(r, a)| vec![(r.lifecycle, a)]),
            };

            match targets {
                Ok(targets) => {
                    for (dependency_lifecycle, target) in targets {
                        let dependency = target.implementation.frame();
                        if lifecycle == Lifecycle::Singleton
                            && dependency_lifecycle == Lifecycle::InstancePerDependency
                        {
                            result.warnings.push(ValidationWarning::SingletonDependsOnPerDependency {
                                singleton: frame.name(),
                                dependency: dependency.name(),
                            });
                        }
                        edges.push(dependency.identity());
                        pending.push((dependency_lifecycle, target));
                    }
                }
                Err(error) if error.is_not_registered() => {
                    result.errors.push(ValidationError::MissingDependency {
                        service: frame.name(),
                        dependency: parameter.service().name(),
                        key: parameter.key().cloned(),
                    })
                }
                Err(error) => result.errors.push(ValidationError::InvalidRegistration {
                    service: frame.name(),
                    error,
                }),
            }
        }

        order.push(frame.identity());
        nodes.insert(
            frame.identity(),
            Node {
                name: frame.name(),
                edges,
            },
        );
    }

    for cycle in detect_cycles(&nodes, &order) {
        result.errors.push(ValidationError::CircularDependency { cycle });
    }

    tracing::debug!(
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "validated configuration"
    );
    result
}

fn detect_cycles(nodes: &AHashMap<Identity, Node>, order: &[Identity]) -> Vec<Vec<&'static str>> {
    let mut visited = HashSet::new();
    let mut path = Vec::new();
    let mut cycles = Vec::new();

    for &start in order {
        if !visited.contains(&start) {
            dfs_cycles(nodes, start, &mut visited, &mut path, &mut cycles);
        }
    }

    cycles
}

fn dfs_cycles(
    nodes: &AHashMap<Identity, Node>,
    current: Identity,
    visited: &mut HashSet<Identity>,
    path: &mut Vec<Identity>,
    cycles: &mut Vec<Vec<&'static str>>,
) {
    if let Some(cycle_start) = path.iter().position(|&identity| identity == current) {
        let cycle = path[cycle_start..]
            .iter()
            .chain(std::iter::once(&current))
            .filter_map(|identity| nodes.get(identity).map(|node| node.name))
            .collect();
        cycles.push(cycle);
        return;
    }

    if !visited.insert(current) {
        return;
    }

    path.push(current);
    if let Some(node) = nodes.get(&current) {
        for &next in &node.edges {
            dfs_cycles(nodes, next, visited, path, cycles);
        }
    }
    path.pop();
}
