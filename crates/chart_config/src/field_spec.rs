//! Declared inheritance policy per field.
//!
//! Merge precedence is data, not merge order. Every field the resolver knows
//! about is listed in a [`FieldSpec`] table with its [`InheritanceMode`] and
//! its built-in default. The resolver walks the table; it never infers
//! precedence from the shape of the operator's values.
//!
//! | mode            | instance declares it        | instance does not declare it |
//! |-----------------|-----------------------------|------------------------------|
//! | `Independent`   | instance value              | service value, else default  |
//! | `AllOrNothing`  | members from the instance block, missing members from the service block | whole service block |
//! | `LocalOnly`     | instance value              | nothing                      |

#[cfg(test)]
#[path = "field_spec_tests.rs"]
mod tests;

/// How a field's value is layered across instance, service and defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InheritanceMode {
    /// Instance value wins if present, else the service value, else the default.
    Independent,

    /// A structured block inherited as a unit.
    ///
    /// When the instance declares no block the service block is used whole.
    /// When it does, each member is taken from the instance block if present
    /// there and from the service block otherwise. `switch` names the member
    /// that turns the block on, e.g. `enabled`.
    AllOrNothing {
        switch: &'static str,
        members: &'static [FieldSpec],
    },

    /// Never inherited. Only the instance's own declaration counts.
    LocalOnly,
}

/// Built-in value used when no layer supplies a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// No default; the field stays unset.
    Unset,
    Integer(i64),
    Flag(bool),
    Text(&'static str),
    /// The in-chart service host, derived from the release name.
    ServiceHost,
    /// The chart-generated secret name, derived from the release name.
    ReleaseSecret,
}

/// Metadata for one inheritable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key of the field inside an instance mapping.
    pub name: &'static str,

    /// Key of the same field at the service layer. Usually equal to `name`;
    /// the auth block is `password` on instances but `auth` on the service.
    pub service_key: &'static str,

    pub mode: InheritanceMode,

    pub default: FieldDefault,

    /// Whether an instance with a cluster member list may inherit this field
    /// from the service layer.
    pub inherit_into_cluster: bool,
}

impl FieldSpec {
    pub const fn independent(name: &'static str, default: FieldDefault) -> Self {
        Self {
            name,
            service_key: name,
            mode: InheritanceMode::Independent,
            default,
            inherit_into_cluster: true,
        }
    }

    pub const fn local_only(name: &'static str) -> Self {
        Self {
            name,
            service_key: name,
            mode: InheritanceMode::LocalOnly,
            default: FieldDefault::Unset,
            inherit_into_cluster: false,
        }
    }

    pub const fn all_or_nothing(
        name: &'static str,
        service_key: &'static str,
        switch: &'static str,
        members: &'static [FieldSpec],
    ) -> Self {
        Self {
            name,
            service_key,
            mode: InheritanceMode::AllOrNothing { switch, members },
            default: FieldDefault::Unset,
            inherit_into_cluster: true,
        }
    }

    /// Marks the field as not inheritable into cluster-topology instances.
    pub const fn local_to_clusters(self) -> Self {
        Self {
            inherit_into_cluster: false,
            ..self
        }
    }

    /// Looks up a member of an all-or-nothing block.
    pub fn member(&self, name: &str) -> Option<&'static FieldSpec> {
        match self.mode {
            InheritanceMode::AllOrNothing { members, .. } => {
                members.iter().find(|member| member.name == name)
            }
            _ => None,
        }
    }
}

/// Members of the Redis password block.
pub const REDIS_AUTH_MEMBERS: &[FieldSpec] = &[
    FieldSpec::independent("enabled", FieldDefault::Flag(true)),
    FieldSpec::independent("secret", FieldDefault::ReleaseSecret),
    FieldSpec::independent("key", FieldDefault::Text("secret")),
];

/// Field table for Redis instances.
pub const REDIS_FIELDS: &[FieldSpec] = &[
    FieldSpec::independent("host", FieldDefault::ServiceHost),
    FieldSpec::independent("port", FieldDefault::Integer(6379)),
    FieldSpec::independent("user", FieldDefault::Unset).local_to_clusters(),
    FieldSpec::all_or_nothing("password", "auth", "enabled", REDIS_AUTH_MEMBERS)
        .local_to_clusters(),
    FieldSpec::local_only("sentinels"),
    FieldSpec::local_only("cluster"),
];

/// Finds a field by its instance-level name.
pub fn find_field<'a>(fields: &'a [FieldSpec], name: &str) -> Option<&'a FieldSpec> {
    fields.iter().find(|field| field.name == name)
}
