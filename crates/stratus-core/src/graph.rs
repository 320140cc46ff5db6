//! Logical resource graphs
//!
//! A [`LogicalGraph`] is an ordered mapping `logical id -> Resource`. The
//! order is the order resources were compiled in, which is also the order
//! the reconciler walks them in. On disk a graph is the JSON document
//! `{"Resources": {"<logicalId>": {"Type": ..., "Properties": ...}}}`.

use crate::error::{CoreError, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use stratus_cloud::{
    ApiGroupSpec, ApiSpec, BucketSpec, FunctionSpec, LogIndexSpec, LogProjectSpec, LogStoreSpec,
    ObjectSpec, Resource, RoleSpec, ServiceSpec, TriggerSpec,
};

/// Ordered mapping of logical id to resource specification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogicalGraph {
    resources: Vec<(String, Resource)>,
}

impl LogicalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource. Re-inserting an existing logical id replaces the
    /// resource in place, keeping its position.
    pub fn insert(&mut self, logical_id: impl Into<String>, resource: Resource) {
        let logical_id = logical_id.into();
        if let Some(slot) = self.resources.iter_mut().find(|(id, _)| *id == logical_id) {
            slot.1 = resource;
        } else {
            self.resources.push((logical_id, resource));
        }
    }

    pub fn contains(&self, logical_id: &str) -> bool {
        self.get(logical_id).is_some()
    }

    pub fn get(&self, logical_id: &str) -> Option<&Resource> {
        self.resources
            .iter()
            .find(|(id, _)| id == logical_id)
            .map(|(_, r)| r)
    }

    pub fn get_mut(&mut self, logical_id: &str) -> Option<&mut Resource> {
        self.resources
            .iter_mut()
            .find(|(id, _)| id == logical_id)
            .map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.resources.iter().map(|(id, r)| (id.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    // Typed accessors used by the reconcilers. Each returns every resource
    // of one kind, in graph order.

    pub fn functions(&self) -> Vec<&FunctionSpec> {
        self.resources
            .iter()
            .filter_map(|(_, r)| match r {
                Resource::Function(spec) => Some(spec),
                _ => None,
            })
            .collect()
    }

    pub fn apis(&self) -> Vec<&ApiSpec> {
        self.resources
            .iter()
            .filter_map(|(_, r)| match r {
                Resource::Api(spec) => Some(spec),
                _ => None,
            })
            .collect()
    }

    pub fn triggers(&self) -> Vec<&TriggerSpec> {
        self.resources
            .iter()
            .filter_map(|(_, r)| match r {
                Resource::Trigger(spec) => Some(spec),
                _ => None,
            })
            .collect()
    }

    pub fn roles(&self) -> Vec<&RoleSpec> {
        self.resources
            .iter()
            .filter_map(|(_, r)| match r {
                Resource::Role(spec) => Some(spec),
                _ => None,
            })
            .collect()
    }

    pub fn bucket(&self) -> Option<&BucketSpec> {
        self.resources.iter().find_map(|(_, r)| match r {
            Resource::Bucket(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn object(&self) -> Option<&ObjectSpec> {
        self.resources.iter().find_map(|(_, r)| match r {
            Resource::Object(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn service(&self) -> Option<&ServiceSpec> {
        self.resources.iter().find_map(|(_, r)| match r {
            Resource::Service(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn api_group(&self) -> Option<&ApiGroupSpec> {
        self.resources.iter().find_map(|(_, r)| match r {
            Resource::ApiGroup(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn log_project(&self) -> Option<&LogProjectSpec> {
        self.resources.iter().find_map(|(_, r)| match r {
            Resource::LogProject(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn log_store(&self) -> Option<&LogStoreSpec> {
        self.resources.iter().find_map(|(_, r)| match r {
            Resource::LogStore(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn log_index(&self) -> Option<&LogIndexSpec> {
        self.resources.iter().find_map(|(_, r)| match r {
            Resource::LogIndex(spec) => Some(spec),
            _ => None,
        })
    }
}

impl Serialize for LogicalGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Document<'a> {
            #[serde(rename = "Resources")]
            resources: ResourceMap<'a>,
        }
        struct ResourceMap<'a>(&'a [(String, Resource)]);
        impl Serialize for ResourceMap<'_> {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (id, resource) in self.0 {
                    map.serialize_entry(id, resource)?;
                }
                map.end()
            }
        }
        Document {
            resources: ResourceMap(&self.resources),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LogicalGraph {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Document {
            #[serde(rename = "Resources")]
            resources: ResourceMap,
        }
        struct ResourceMap(Vec<(String, Resource)>);
        impl<'de> Deserialize<'de> for ResourceMap {
            fn deserialize<D: Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                struct MapOrder;
                impl<'de> Visitor<'de> for MapOrder {
                    type Value = ResourceMap;

                    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                        f.write_str("a map of logical id to resource")
                    }

                    fn visit_map<A: MapAccess<'de>>(
                        self,
                        mut access: A,
                    ) -> std::result::Result<Self::Value, A::Error> {
                        let mut resources =
                            Vec::with_capacity(access.size_hint().unwrap_or(0));
                        while let Some(entry) = access.next_entry::<String, Resource>()? {
                            resources.push(entry);
                        }
                        Ok(ResourceMap(resources))
                    }
                }
                deserializer.deserialize_map(MapOrder)
            }
        }
        let doc = Document::deserialize(deserializer)?;
        Ok(LogicalGraph {
            resources: doc.resources.0,
        })
    }
}

/// The create (bootstrap) and update (per-deploy) graphs of one service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPair {
    pub create: LogicalGraph,
    pub update: LogicalGraph,
}

impl GraphPair {
    /// Check cross-graph references: every update-graph resource that names
    /// a create-graph resource must resolve within the pair.
    pub fn validate(&self) -> Result<()> {
        let service = self.create.service().map(|s| s.name.clone());
        let bucket = self.create.bucket().map(|b| b.name.clone());
        let roles: Vec<&str> = self
            .create
            .roles()
            .iter()
            .chain(self.update.roles().iter())
            .map(|r| r.name.as_str())
            .collect();
        let group = self.update.api_group().map(|g| g.name.clone());

        for function in self.update.functions() {
            if service.as_deref() != Some(function.service.as_str()) {
                return Err(CoreError::InvalidGraph(format!(
                    "function '{}' references unknown service '{}'",
                    function.name, function.service
                )));
            }
            if bucket.as_deref() != Some(function.code_bucket.as_str()) {
                return Err(CoreError::InvalidGraph(format!(
                    "function '{}' references unknown code bucket '{}'",
                    function.name, function.code_bucket
                )));
            }
        }

        if let Some(object) = self.update.object() {
            if bucket.as_deref() != Some(object.bucket.as_str()) {
                return Err(CoreError::InvalidGraph(format!(
                    "artifact object references unknown bucket '{}'",
                    object.bucket
                )));
            }
        }

        for api in self.update.apis() {
            if group.as_deref() != Some(api.group.as_str()) {
                return Err(CoreError::InvalidGraph(format!(
                    "api '{}' references unknown group '{}'",
                    api.name, api.group
                )));
            }
            if !roles.contains(&api.role.as_str()) {
                return Err(CoreError::InvalidGraph(format!(
                    "api '{}' references unknown role '{}'",
                    api.name, api.role
                )));
            }
        }

        for trigger in self.update.triggers() {
            if !roles.contains(&trigger.role.as_str()) {
                return Err(CoreError::InvalidGraph(format!(
                    "trigger '{}' references unknown role '{}'",
                    trigger.name, trigger.role
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_cloud::BucketSpec;

    fn bucket(name: &str) -> Resource {
        Resource::Bucket(BucketSpec {
            name: name.to_string(),
            region: "cn-shanghai".to_string(),
        })
    }

    #[test]
    fn graph_preserves_insertion_order() {
        let mut graph = LogicalGraph::new();
        graph.insert("z-last", bucket("z"));
        graph.insert("a-first", bucket("a"));

        let ids: Vec<&str> = graph.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["z-last", "a-first"]);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut graph = LogicalGraph::new();
        graph.insert("one", bucket("first"));
        graph.insert("two", bucket("second"));
        graph.insert("one", bucket("replaced"));

        assert_eq!(graph.len(), 2);
        let ids: Vec<&str> = graph.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["one", "two"]);
        assert_eq!(graph.bucket().unwrap().name, "replaced");
    }

    #[test]
    fn graph_document_round_trips_in_order() {
        let mut graph = LogicalGraph::new();
        graph.insert("svc-bucket", bucket("artifacts"));
        graph.insert("svc-bucket-2", bucket("artifacts-2"));

        let json = serde_json::to_string(&graph).unwrap();
        assert!(json.starts_with(r#"{"Resources":{"svc-bucket":{"Type":"Bucket""#));

        let back: LogicalGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(back, graph);
    }
}
