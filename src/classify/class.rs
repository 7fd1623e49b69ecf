//! The class stereotype rule table.
//!
//! Counts aggregate over non-constructor/destructor methods; a method
//! contributes to one counter per label it carries. Every ratio rule is
//! guarded against a zero denominator: with nothing to divide by, the
//! rule does not fire.

use crate::core::{ClassModel, ClassStereotype, Method, MethodStereotype};

/// Aggregated label counts for one class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClassCounts {
    /// Non-constructor/destructor methods.
    pub methods: usize,
    pub getters: usize,
    pub accessors: usize,
    pub setters: usize,
    pub commands: usize,
    pub mutators: usize,
    pub controllers: usize,
    /// `collaborator` + `wrapper` labels.
    pub collab_only: usize,
    /// `controller` + `collab_only`.
    pub collaborators: usize,
    pub factories: usize,
    /// `incidental` + `stateless` + `empty` labels.
    pub degenerates: usize,
    /// Methods carrying none of `collaborator`, `controller`, `wrapper`.
    pub non_collaborators: usize,
}

impl ClassCounts {
    pub fn tally(methods: &[Method]) -> ClassCounts {
        let mut counts = ClassCounts::default();
        for method in methods {
            if method.is_constructor_or_destructor {
                continue;
            }
            counts.methods += 1;
            let has = |label| method.has(label) as usize;

            // The derived sums add up label counts, so a method carrying
            // both `get` and `property` contributes twice to `accessors`.
            counts.getters += has(MethodStereotype::Get);
            counts.accessors += has(MethodStereotype::Get)
                + has(MethodStereotype::Predicate)
                + has(MethodStereotype::Property)
                + has(MethodStereotype::VoidAccessor);
            counts.setters += has(MethodStereotype::Set);
            counts.commands +=
                has(MethodStereotype::Command) + has(MethodStereotype::NonVoidCommand);
            counts.controllers += has(MethodStereotype::Controller);
            counts.collab_only +=
                has(MethodStereotype::Collaborator) + has(MethodStereotype::Wrapper);
            counts.factories += has(MethodStereotype::Factory);
            counts.degenerates += has(MethodStereotype::Incidental)
                + has(MethodStereotype::Stateless)
                + has(MethodStereotype::Empty);

            let collaborates = method.has(MethodStereotype::Collaborator)
                || method.has(MethodStereotype::Controller)
                || method.has(MethodStereotype::Wrapper);
            if !collaborates {
                counts.non_collaborators += 1;
            }
        }
        counts.mutators = counts.setters + counts.commands;
        counts.collaborators = counts.controllers + counts.collab_only;
        counts
    }
}

pub fn classify_class(model: &ClassModel, methods_per_class_threshold: usize) -> Vec<ClassStereotype> {
    let counts = ClassCounts::tally(&model.methods);
    classify_counts(counts, methods_per_class_threshold)
}

pub fn classify_counts(
    counts: ClassCounts,
    methods_per_class_threshold: usize,
) -> Vec<ClassStereotype> {
    let ClassCounts {
        methods: m,
        getters,
        accessors,
        setters,
        commands,
        mutators,
        controllers,
        collab_only,
        collaborators,
        factories,
        degenerates,
        non_collaborators,
    } = counts;
    let mf = m as f64;

    let mut labels = Vec::new();

    let collaboration_heavy = non_collaborators > 0 && collaborators >= 2 * non_collaborators;

    if accessors > getters && mutators > setters && controllers == 0 && collaboration_heavy {
        labels.push(ClassStereotype::Entity);
    }

    if m == getters + setters + commands
        && getters > 0
        && setters > 0
        && commands > 0
        && collaboration_heavy
    {
        labels.push(ClassStereotype::MinimalEntity);
    }

    if accessors > 2 * mutators && accessors > 2 * (controllers + factories) {
        labels.push(ClassStereotype::DataProvider);
    }

    if mutators > 2 * accessors && mutators > 2 * (controllers + factories) {
        labels.push(ClassStereotype::Commander);
    }

    if collaborators > non_collaborators
        && (factories as f64) < 0.5 * mf
        && (controllers as f64) < 0.33 * mf
    {
        labels.push(ClassStereotype::Boundary);
    }

    if factories as f64 > 0.67 * mf && m > 0 {
        labels.push(ClassStereotype::Factory);
    }

    if (controllers + factories) as f64 > 0.67 * mf && m > 0 && (accessors > 0 || mutators > 0) {
        labels.push(ClassStereotype::Controller);
    }

    if controllers + factories > 0 && accessors + mutators + collab_only == 0 && controllers > 0 {
        labels.push(ClassStereotype::PureController);
    }

    let am = (accessors + mutators) as f64;
    let cf = (controllers + factories) as f64;
    if 0.2 * mf < am
        && am < 0.67 * mf
        && 0.2 * mf < cf
        && cf < 0.67 * mf
        && factories > 0
        && controllers > 0
        && accessors > 0
        && mutators > 0
        && m > methods_per_class_threshold
    {
        labels.push(ClassStereotype::LargeClass);
    }

    if getters + setters > 0 && m > 0 {
        let degenerate_share = degenerates as f64 / mf;
        let residue = (m as i64 - (degenerates + getters + setters) as i64) as f64 / mf;
        if degenerate_share > 0.33 && residue <= 0.2 {
            labels.push(ClassStereotype::LazyClass);
        }
    }

    if m > 0 && degenerates as f64 / mf > 0.5 {
        labels.push(ClassStereotype::Degenerate);
    }

    if m == getters + setters && getters + setters > 0 {
        labels.push(ClassStereotype::DataClass);
    }

    if m > 0 && m < 3 {
        labels.push(ClassStereotype::SmallClass);
    }

    if m == 0 {
        labels.push(ClassStereotype::Empty);
    }

    if labels.is_empty() {
        labels.push(ClassStereotype::Unclassified);
    }
    labels
}
