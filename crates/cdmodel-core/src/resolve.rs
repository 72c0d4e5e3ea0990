//! Inheritance resolution
//!
//! Walks a single-parent `extends` chain and flattens the per-level properties
//! into an effective set. Purposes merge their exhibited traits; trait
//! definitions merge their parameters. The walk is an explicit visited-set
//! traversal so a cyclic chain fails instead of looping.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::ModelError;
use crate::object::JsonObject;
use crate::purpose::Purpose;
use crate::reference::{NamedReferenceOrDefinition, Referenceable};
use crate::traits::{Parameter, TraitDefinition, TraitReference};

/// Looks up definitions by name
///
/// Implemented by [`crate::document::Document`] for same-document
/// resolution. Other implementations can resolve across documents.
pub trait DefinitionLookup {
    fn purpose(&self, name: &str) -> Option<&Purpose>;

    fn trait_definition(&self, name: &str) -> Option<&TraitDefinition>;
}

/// A definition with at most one parent
pub trait Inheritable: Referenceable {
    /// The parent reference, if any
    fn parent(&self) -> Option<&NamedReferenceOrDefinition<Self>>;

    /// Find a definition of this kind by name
    fn find<'a, L: DefinitionLookup + ?Sized>(lookup: &'a L, name: &str) -> Option<&'a Self>;
}

impl Inheritable for Purpose {
    fn parent(&self) -> Option<&NamedReferenceOrDefinition<Self>> {
        self.extends_purpose.as_ref()
    }

    fn find<'a, L: DefinitionLookup + ?Sized>(lookup: &'a L, name: &str) -> Option<&'a Self> {
        lookup.purpose(name)
    }
}

impl Inheritable for TraitDefinition {
    fn parent(&self) -> Option<&NamedReferenceOrDefinition<Self>> {
        self.extends_trait.as_ref()
    }

    fn find<'a, L: DefinitionLookup + ?Sized>(lookup: &'a L, name: &str) -> Option<&'a Self> {
        lookup.trait_definition(name)
    }
}

/// The chain from `start` up to its root, `start` first
///
/// Named parents are looked up through `lookup`; inline parents are used as-is.
/// Revisiting a name fails with `CyclicInheritance` carrying the cycle path.
pub fn ancestry<'a, T, L>(start: &'a T, lookup: &'a L) -> Result<Vec<&'a T>, ModelError>
where
    T: Inheritable,
    L: DefinitionLookup + ?Sized,
{
    let mut visited: HashSet<&'a str> = HashSet::new();
    let mut chain: Vec<&'a T> = Vec::new();
    let mut current = Some(start);

    while let Some(node) = current {
        let name = node.reference_name();

        if !visited.insert(name) {
            let mut cycle: Vec<String> = chain
                .iter()
                .map(|n| n.reference_name())
                .skip_while(|n| *n != name)
                .map(str::to_string)
                .collect();
            cycle.push(name.to_string());
            return Err(ModelError::CyclicInheritance { cycle });
        }

        chain.push(node);

        current = match node.parent() {
            None => None,
            Some(NamedReferenceOrDefinition::Name(parent)) => {
                let found = T::find(lookup, parent).ok_or_else(|| ModelError::UnresolvedReference {
                    kind: T::KIND,
                    name: parent.clone(),
                })?;
                Some(found)
            }
            Some(NamedReferenceOrDefinition::Definition(parent)) => Some(&**parent),
        };
    }

    Ok(chain)
}

/// Merge levels root first; a repeated key replaces the earlier entry and moves to the end
fn merge_levels<'a, E, I, K>(levels: I, key: K) -> Vec<E>
where
    E: Clone + 'a,
    I: IntoIterator<Item = &'a [E]>,
    K: Fn(&E) -> &str,
{
    let mut effective: Vec<E> = Vec::new();

    for level in levels {
        for item in level {
            if let Some(pos) = effective.iter().position(|e| key(e) == key(item)) {
                effective.remove(pos);
            }
            effective.push(item.clone());
        }
    }

    effective
}

/// Effective trait set of a purpose
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectiveTraits {
    /// Purposes walked, most derived first
    pub chain: Vec<String>,

    traits: Vec<NamedReferenceOrDefinition<TraitReference>>,
}

impl EffectiveTraits {
    /// Trait names in effective order
    pub fn names(&self) -> Vec<&str> {
        self.traits.iter().map(|t| t.referenced_name()).collect()
    }

    pub fn get(&self, trait_name: &str) -> Option<&NamedReferenceOrDefinition<TraitReference>> {
        self.traits.iter().find(|t| t.referenced_name() == trait_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedReferenceOrDefinition<TraitReference>> {
        self.traits.iter()
    }

    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    pub fn into_vec(self) -> Vec<NamedReferenceOrDefinition<TraitReference>> {
        self.traits
    }

    /// The effective traits in exhibitsTraits form
    pub fn to_json(&self) -> Value {
        Value::Array(self.traits.iter().map(|t| t.to_json()).collect())
    }
}

/// Effective parameter set of a trait definition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectiveParameters {
    /// Traits walked, most derived first
    pub chain: Vec<String>,

    parameters: Vec<Parameter>,
}

impl EffectiveParameters {
    pub fn names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn into_vec(self) -> Vec<Parameter> {
        self.parameters
    }

    /// The effective parameters in hasParameters form
    pub fn to_json(&self) -> Value {
        Value::Array(self.parameters.iter().map(Parameter::to_json).collect())
    }
}

fn chain_names<T: Referenceable>(chain: &[&T]) -> Vec<String> {
    chain.iter().map(|n| n.reference_name().to_string()).collect()
}

/// Resolve the effective exhibited traits of `purpose`
///
/// Ancestor traits come first; a trait re-exhibited by a more derived purpose
/// replaces the ancestor's entry entirely and moves to the end.
pub fn resolve_purpose<L>(purpose: &Purpose, lookup: &L) -> Result<EffectiveTraits, ModelError>
where
    L: DefinitionLookup + ?Sized,
{
    let chain = ancestry(purpose, lookup)?;

    let traits = merge_levels(
        chain.iter().rev().map(|p| p.exhibits_traits.as_slice()),
        |t| t.referenced_name(),
    );

    tracing::debug!(
        purpose = %purpose.purpose_name,
        depth = chain.len(),
        traits = traits.len(),
        "resolved purpose"
    );

    Ok(EffectiveTraits {
        chain: chain_names(&chain),
        traits,
    })
}

/// Resolve the effective parameters of `definition`
///
/// Same walk and override rule as [`resolve_purpose`], keyed by parameter name.
pub fn resolve_trait<L>(definition: &TraitDefinition, lookup: &L) -> Result<EffectiveParameters, ModelError>
where
    L: DefinitionLookup + ?Sized,
{
    let chain = ancestry(definition, lookup)?;

    let parameters = merge_levels(
        chain.iter().rev().map(|t| t.has_parameters.as_slice()),
        |p| p.name.as_str(),
    );

    tracing::debug!(
        trait_name = %definition.trait_name,
        depth = chain.len(),
        parameters = parameters.len(),
        "resolved trait"
    );

    Ok(EffectiveParameters {
        chain: chain_names(&chain),
        parameters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::TraitArgument;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Definitions {
        purposes: HashMap<String, Purpose>,
        traits: HashMap<String, TraitDefinition>,
    }

    impl Definitions {
        fn with_purpose(mut self, purpose: Purpose) -> Self {
            self.purposes.insert(purpose.purpose_name.clone(), purpose);
            self
        }

        fn with_trait(mut self, definition: TraitDefinition) -> Self {
            self.traits.insert(definition.trait_name.clone(), definition);
            self
        }
    }

    impl DefinitionLookup for Definitions {
        fn purpose(&self, name: &str) -> Option<&Purpose> {
            self.purposes.get(name)
        }

        fn trait_definition(&self, name: &str) -> Option<&TraitDefinition> {
            self.traits.get(name)
        }
    }

    fn inline_trait(name: &str, argument: i64) -> NamedReferenceOrDefinition<TraitReference> {
        NamedReferenceOrDefinition::defined(
            TraitReference::new(name).with_argument(TraitArgument::named("level", json!(argument))),
        )
    }

    #[test]
    fn derived_trait_overrides_ancestor() {
        let defs = Definitions::default()
            .with_purpose(Purpose::new("A").exhibiting(inline_trait("T1", 1)))
            .with_purpose(
                Purpose::new("B")
                    .extending("A".into())
                    .exhibiting(inline_trait("T1", 2))
                    .exhibiting("T2".into()),
            );

        let effective = resolve_purpose(defs.purpose("B").unwrap(), &defs).unwrap();
        assert_eq!(effective.names(), vec!["T1", "T2"]);
        assert_eq!(effective.chain, vec!["B", "A"]);

        let t1 = effective.get("T1").unwrap().as_definition().unwrap();
        assert_eq!(t1.argument("level"), Some(&json!(2)));
    }

    #[test]
    fn ancestor_traits_come_first() {
        let defs = Definitions::default()
            .with_purpose(Purpose::new("root").exhibiting("R1".into()).exhibiting("R2".into()))
            .with_purpose(Purpose::new("mid").extending("root".into()).exhibiting("M1".into()))
            .with_purpose(
                Purpose::new("leaf")
                    .extending("mid".into())
                    .exhibiting("L1".into())
                    .exhibiting("R1".into()),
            );

        let effective = resolve_purpose(defs.purpose("leaf").unwrap(), &defs).unwrap();
        assert_eq!(effective.names(), vec!["R2", "M1", "L1", "R1"]);
    }

    #[test]
    fn two_purpose_cycle_is_detected_from_either_side() {
        let defs = Definitions::default()
            .with_purpose(Purpose::new("A").extending("B".into()))
            .with_purpose(Purpose::new("B").extending("A".into()));

        for (start, cycle) in [("A", vec!["A", "B", "A"]), ("B", vec!["B", "A", "B"])] {
            let err = resolve_purpose(defs.purpose(start).unwrap(), &defs).unwrap_err();
            assert_eq!(
                err,
                ModelError::CyclicInheritance {
                    cycle: cycle.into_iter().map(String::from).collect(),
                }
            );
        }
    }

    #[test]
    fn self_extension_is_a_cycle() {
        let defs = Definitions::default().with_purpose(Purpose::new("self").extending("self".into()));
        assert!(matches!(
            resolve_purpose(defs.purpose("self").unwrap(), &defs),
            Err(ModelError::CyclicInheritance { .. })
        ));
    }

    #[test]
    fn cycle_path_starts_at_revisited_node() {
        let defs = Definitions::default()
            .with_purpose(Purpose::new("X").extending("Y".into()))
            .with_purpose(Purpose::new("Y").extending("Z".into()))
            .with_purpose(Purpose::new("Z").extending("Y".into()));

        let err = resolve_purpose(defs.purpose("X").unwrap(), &defs).unwrap_err();
        assert_eq!(
            err,
            ModelError::CyclicInheritance {
                cycle: vec!["Y".into(), "Z".into(), "Y".into()],
            }
        );
    }

    #[test]
    fn inline_parent_needs_no_lookup() {
        let defs = Definitions::default();
        let purpose = Purpose::new("child")
            .extending(NamedReferenceOrDefinition::defined(Purpose::new("parent").exhibiting("P".into())))
            .exhibiting("C".into());

        let effective = resolve_purpose(&purpose, &defs).unwrap();
        assert_eq!(effective.names(), vec!["P", "C"]);
    }

    #[test]
    fn missing_parent_is_unresolved() {
        let defs = Definitions::default();
        let purpose = Purpose::new("orphan").extending("nowhere".into());

        assert_eq!(
            resolve_purpose(&purpose, &defs).unwrap_err(),
            ModelError::UnresolvedReference {
                kind: "purpose",
                name: "nowhere".into(),
            }
        );
    }

    #[test]
    fn resolution_leaves_inputs_untouched() {
        let defs = Definitions::default()
            .with_purpose(Purpose::new("A").exhibiting(inline_trait("T1", 1)))
            .with_purpose(Purpose::new("B").extending("A".into()).exhibiting(inline_trait("T1", 2)));
        let before = defs.purpose("A").unwrap().clone();

        resolve_purpose(defs.purpose("B").unwrap(), &defs).unwrap();
        assert_eq!(defs.purpose("A").unwrap(), &before);
    }

    #[test]
    fn trait_parameters_follow_override_rule() {
        let defs = Definitions::default()
            .with_trait(
                TraitDefinition::new("is.constrained")
                    .with_parameter(Parameter::new("minimumValue"))
                    .with_parameter(Parameter::new("maximumLength").with_default(json!(64))),
            )
            .with_trait(
                TraitDefinition::new("is.constrained.strict")
                    .extending("is.constrained".into())
                    .with_parameter(Parameter::new("maximumLength").with_default(json!(16))),
            );

        let effective = resolve_trait(defs.trait_definition("is.constrained.strict").unwrap(), &defs).unwrap();
        assert_eq!(effective.names(), vec!["minimumValue", "maximumLength"]);
        assert_eq!(effective.get("maximumLength").unwrap().default_value, Some(json!(16)));
    }

    #[test]
    fn trait_cycle_is_detected() {
        let defs = Definitions::default()
            .with_trait(TraitDefinition::new("a").extending("b".into()))
            .with_trait(TraitDefinition::new("b").extending("a".into()));

        assert!(matches!(
            resolve_trait(defs.trait_definition("a").unwrap(), &defs),
            Err(ModelError::CyclicInheritance { .. })
        ));
    }

    #[test]
    fn effective_traits_serialize_as_exhibits_traits() {
        let defs = Definitions::default()
            .with_purpose(Purpose::new("A").exhibiting("T0".into()).exhibiting(inline_trait("T1", 3)));

        let effective = resolve_purpose(defs.purpose("A").unwrap(), &defs).unwrap();
        assert_eq!(
            effective.to_json(),
            json!(["T0", { "traitName": "T1", "arguments": [{ "name": "level", "value": 3 }] }])
        );
    }
}
