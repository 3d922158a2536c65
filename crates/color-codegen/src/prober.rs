//! Capability probing against a reference type's static metadata.

use crate::metadata::TypeMetadataSource;
use crate::types::{MemberInfo, ProbeOutcome, Visibility};

/// Answers "does the reference type expose `pub const NAME: Self`?" for
/// candidate names.
///
/// The reference type's members are fetched once, when the prober is built.
/// An unresolvable type or a failing metadata source is logged and treated as
/// a type with no members, so every probe answers `false`.
#[derive(Debug, Clone)]
pub struct Prober {
    reference_type: String,
    members: Vec<MemberInfo>,
}

impl Prober {
    pub fn new<M>(metadata: &M, reference_type: impl Into<String>) -> Self
    where
        M: TypeMetadataSource + ?Sized,
    {
        let reference_type: String = reference_type.into();
        let reference_type = reference_type.trim_start_matches("::").to_string();
        let members = match metadata.members(&reference_type) {
            Ok(members) => members,
            Err(err) => {
                tracing::warn!(
                    reference_type = %reference_type,
                    error = %err,
                    "reference type metadata unavailable; every probe will report absent"
                );
                Vec::new()
            }
        };
        Self {
            reference_type,
            members,
        }
    }

    pub fn reference_type(&self) -> &str {
        &self.reference_type
    }

    /// Whether the reference type has a public static member named exactly
    /// `name` whose declared type is the reference type itself.
    pub fn probe(&self, name: &str) -> bool {
        self.members.iter().any(|member| {
            member.is_static
                && member.visibility == Visibility::Public
                && member.name == name
                && member.value_type == self.reference_type
        })
    }

    /// Probe each name, keeping request order.
    pub fn probe_all<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<ProbeOutcome> {
        names
            .into_iter()
            .map(|name| {
                let found = self.probe(name);
                tracing::debug!(name, found, "probed reference type");
                ProbeOutcome {
                    name: name.to_string(),
                    found,
                }
            })
            .collect()
    }
}
