use crate::{AttributeId, ClusterId, CommandId, Value};

// Represents a specific device type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceType {
    pub name: String,
    pub code: u32,
    pub revision: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeInstance {
    pub id: AttributeId,
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterInstance {
    pub id: ClusterId,
    pub name: String,
    pub attributes: Vec<AttributeInstance>,
    pub accepted_commands: Vec<CommandId>,
    pub generated_commands: Vec<CommandId>,
}

impl ClusterInstance {
    pub fn attribute(&self, id: AttributeId) -> Option<&AttributeInstance> {
        self.attributes.iter().find(|a| a.id == id)
    }

    pub fn attribute_mut(&mut self, id: AttributeId) -> Option<&mut AttributeInstance> {
        self.attributes.iter_mut().find(|a| a.id == id)
    }

    pub fn accepts(&self, command: CommandId) -> bool {
        self.accepted_commands.contains(&command)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Endpoint {
    pub id: u16,
    pub device_types: Vec<DeviceType>,
    pub clusters: Vec<ClusterInstance>,
}

impl Endpoint {
    pub fn cluster(&self, id: ClusterId) -> Option<&ClusterInstance> {
        self.clusters.iter().find(|c| c.id == id)
    }

    pub fn cluster_mut(&mut self, id: ClusterId) -> Option<&mut ClusterInstance> {
        self.clusters.iter_mut().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_by_id() {
        let mut ep = Endpoint {
            id: 1,
            device_types: vec![],
            clusters: vec![ClusterInstance {
                id: ClusterId(6),
                name: "OnOff".into(),
                attributes: vec![AttributeInstance {
                    id: AttributeId(0),
                    name: "OnOff".into(),
                    value: Value::Bool(false),
                }],
                accepted_commands: vec![CommandId(0), CommandId(1)],
                generated_commands: vec![],
            }],
        };

        assert!(ep.cluster(ClusterId(7)).is_none());
        let cluster = ep.cluster_mut(ClusterId(6)).expect("cluster exists");
        assert!(cluster.accepts(CommandId(1)));
        assert!(!cluster.accepts(CommandId(2)));

        cluster
            .attribute_mut(AttributeId(0))
            .expect("attribute exists")
            .value = Value::Bool(true);
        assert_eq!(
            ep.cluster(ClusterId(6))
                .and_then(|c| c.attribute(AttributeId(0)))
                .map(|a| &a.value),
            Some(&Value::Bool(true))
        );
    }
}
