use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fmt;

pub const SERVING_API_VERSION: &str = "serving.knative.dev/v1";
pub const LIST_API_VERSION: &str = "v1";
pub const LIST_KIND: &str = "List";

/// The closed set of resource kinds a client can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Service,
    Revision,
    Route,
    Configuration,
}

impl Kind {
    pub const ALL: [Kind; 4] = [
        Kind::Service,
        Kind::Revision,
        Kind::Route,
        Kind::Configuration,
    ];

    pub fn api_version(&self) -> &'static str {
        SERVING_API_VERSION
    }

    /// Value of the `kind` field on a stamped object.
    pub fn type_name(&self) -> &'static str {
        match self {
            Kind::Service => "Service",
            Kind::Revision => "Revision",
            Kind::Route => "Route",
            Kind::Configuration => "Configuration",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Service => "service",
            Kind::Revision => "revision",
            Kind::Route => "route",
            Kind::Configuration => "configuration",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub labels: BTreeMap<String, String>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_version: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub generation: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_timestamp: Option<DateTime<Utc>>,
    /// Any other metadata fields, kept in their original order.
    #[serde(flatten)]
    pub extra: Mapping,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// A named, namespaced serving object. `spec` and `status` are opaque to the
/// clients and survive a write/read cycle unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
}

impl Resource {
    pub fn new(kind: Kind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_version: kind.api_version().to_string(),
            kind: kind.type_name().to_string(),
            metadata: ObjectMeta {
                name: name.into(),
                namespace: namespace.into(),
                ..Default::default()
            },
            spec: None,
            status: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    /// Image of the first container in the revision template, if any.
    pub fn image(&self) -> Option<&str> {
        self.spec
            .as_ref()?
            .get("template")?
            .get("spec")?
            .get("containers")?
            .get(0)?
            .get("image")?
            .as_str()
    }

    pub fn set_image(&mut self, image: &str) {
        self.first_container()
            .insert(Value::from("image"), Value::from(image));
    }

    /// Sets or replaces an environment variable on the first container.
    pub fn set_env(&mut self, name: &str, value: &str) {
        let container = self.first_container();
        let env = container
            .entry(Value::from("env"))
            .or_insert_with(|| Value::Sequence(Vec::new()));
        if !env.is_sequence() {
            *env = Value::Sequence(Vec::new());
        }
        let Value::Sequence(vars) = env else {
            unreachable!("env was just set to a sequence")
        };

        let mut var = Mapping::new();
        var.insert(Value::from("name"), Value::from(name));
        var.insert(Value::from("value"), Value::from(value));

        match vars
            .iter_mut()
            .find(|v| v.get("name").and_then(Value::as_str) == Some(name))
        {
            Some(existing) => *existing = Value::Mapping(var),
            None => vars.push(Value::Mapping(var)),
        }
    }

    /// `spec.template.spec.containers[0]`, created on demand.
    fn first_container(&mut self) -> &mut Mapping {
        let spec = self.spec.get_or_insert_with(|| Value::Mapping(Mapping::new()));
        if !spec.is_mapping() {
            *spec = Value::Mapping(Mapping::new());
        }
        let Value::Mapping(spec) = spec else {
            unreachable!("spec was just set to a mapping")
        };

        let template = child_mapping(spec, "template");
        let pod_spec = child_mapping(template, "spec");
        let containers = pod_spec
            .entry(Value::from("containers"))
            .or_insert_with(|| Value::Sequence(Vec::new()));
        if !containers.is_sequence() {
            *containers = Value::Sequence(Vec::new());
        }
        let Value::Sequence(containers) = containers else {
            unreachable!("containers was just set to a sequence")
        };
        if containers.is_empty() {
            containers.push(Value::Mapping(Mapping::new()));
        }
        if !containers[0].is_mapping() {
            containers[0] = Value::Mapping(Mapping::new());
        }
        let Value::Mapping(container) = &mut containers[0] else {
            unreachable!("first container was just set to a mapping")
        };
        container
    }
}

fn child_mapping<'a>(map: &'a mut Mapping, key: &str) -> &'a mut Mapping {
    let slot = map
        .entry(Value::from(key))
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    if !slot.is_mapping() {
        *slot = Value::Mapping(Mapping::new());
    }
    let Value::Mapping(child) = slot else {
        unreachable!("slot was just set to a mapping")
    };
    child
}

/// Result of a list call: objects of one kind under a synthetic `v1/List` header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceList {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub items: Vec<Resource>,
}

impl ResourceList {
    pub fn new(items: Vec<Resource>) -> Self {
        Self {
            api_version: LIST_API_VERSION.to_string(),
            kind: LIST_KIND.to_string(),
            items,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
