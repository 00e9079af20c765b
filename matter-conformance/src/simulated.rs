//! An in-memory device under test.
//!
//! [`SimulatedDevice`] answers reads and invokes from an [`Endpoint`]
//! composition. The default build is a Microwave Oven with two modes; tests
//! reshape it through the builder methods to provoke failures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use matter_data_model::clusters::mwom::{
    self, attributes, commands, mode_tags, ChangeToMode, ChangeToModeResponse, ModeChangeStatus,
    ModeOption,
};
use matter_data_model::{
    AttributeId, AttributeInstance, ClusterId, ClusterInstance, CommandId, CommandRequest,
    DeviceType, Endpoint, EndpointId, ImStatus, InvokeResponse, Value,
};
use tracing::{debug, trace};

use crate::controller::{DeviceController, TransportError};

/// Global attribute listing the commands a cluster instance accepts.
pub const ACCEPTED_COMMAND_LIST: AttributeId = AttributeId(0xFFF9);
/// Global attribute listing the commands a cluster instance generates.
pub const GENERATED_COMMAND_LIST: AttributeId = AttributeId(0xFFF8);

pub struct SimulatedDevice {
    endpoints: Mutex<Vec<Endpoint>>,
    canned: HashMap<(ClusterId, CommandId), InvokeResponse>,
    unreachable: AtomicBool,
    reads: AtomicUsize,
    invokes: AtomicUsize,
}

/// The modes of the default simulated oven.
pub fn default_microwave_modes() -> Vec<ModeOption> {
    vec![
        ModeOption::new("Normal", 0, &[mode_tags::NORMAL]),
        ModeOption::new("Defrost", 1, &[mode_tags::DEFROST]),
    ]
}

/// A Microwave Oven endpoint hosting the Microwave Oven Mode cluster.
pub fn microwave_oven_endpoint(id: u16, modes: &[ModeOption], current_mode: u8) -> Endpoint {
    Endpoint {
        id,
        device_types: vec![DeviceType {
            name: "Microwave Oven".to_string(),
            code: mwom::MICROWAVE_OVEN_DEVICE_TYPE,
            revision: 1,
        }],
        clusters: vec![ClusterInstance {
            id: mwom::CLUSTER_ID,
            name: mwom::CLUSTER_NAME.to_string(),
            attributes: vec![
                AttributeInstance {
                    id: attributes::SUPPORTED_MODES,
                    name: "SupportedModes".to_string(),
                    value: mwom::encode_supported_modes(modes),
                },
                AttributeInstance {
                    id: attributes::CURRENT_MODE,
                    name: "CurrentMode".to_string(),
                    value: Value::from(current_mode),
                },
            ],
            accepted_commands: vec![],
            generated_commands: vec![],
        }],
    }
}

impl SimulatedDevice {
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self {
            endpoints: Mutex::new(endpoints),
            canned: HashMap::new(),
            unreachable: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
            invokes: AtomicUsize::new(0),
        }
    }

    /// A conforming Microwave Oven on `endpoint`, in `Normal` mode.
    pub fn microwave_oven(endpoint: u16) -> Self {
        Self::new(vec![microwave_oven_endpoint(
            endpoint,
            &default_microwave_modes(),
            0,
        )])
    }

    /// Makes every Microwave Oven Mode instance accept `ChangeToMode`, which
    /// a conforming oven does not.
    pub fn accept_change_to_mode(self) -> Self {
        {
            let mut endpoints = self.lock();
            for cluster in endpoints
                .iter_mut()
                .filter_map(|ep| ep.cluster_mut(mwom::CLUSTER_ID))
            {
                cluster.accepted_commands.push(commands::CHANGE_TO_MODE);
                cluster
                    .generated_commands
                    .push(commands::CHANGE_TO_MODE_RESPONSE);
            }
        }
        self
    }

    /// Answers `command` with `response` regardless of the request.
    pub fn with_canned_response(
        mut self,
        cluster: ClusterId,
        command: CommandId,
        response: InvokeResponse,
    ) -> Self {
        self.canned.insert((cluster, command), response);
        self
    }

    pub fn set_attribute(
        &self,
        endpoint: u16,
        cluster: ClusterId,
        attribute: AttributeId,
        value: Value,
    ) -> bool {
        let mut endpoints = self.lock();
        let Some(instance) = endpoints
            .iter_mut()
            .find(|ep| ep.id == endpoint)
            .and_then(|ep| ep.cluster_mut(cluster))
            .and_then(|c| c.attribute_mut(attribute))
        else {
            return false;
        };
        instance.value = value;
        true
    }

    /// Makes every later call fail as if the device dropped off the network.
    pub fn disconnect(&self) {
        self.unreachable.store(true, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn invokes(&self) -> usize {
        self.invokes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Endpoint>> {
        self.endpoints.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_reachable(&self) -> Result<(), TransportError> {
        if self.unreachable.load(Ordering::SeqCst) {
            Err(TransportError::Unreachable(
                "simulated device disconnected".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn read(
        endpoints: &[Endpoint],
        endpoint: EndpointId,
        cluster: ClusterId,
        attribute: AttributeId,
    ) -> Result<Value, ImStatus> {
        let instance = endpoints
            .iter()
            .find(|ep| ep.id == endpoint.0)
            .ok_or(ImStatus::UnsupportedEndpoint)?
            .cluster(cluster)
            .ok_or(ImStatus::UnsupportedCluster)?;

        let command_list = |ids: &[CommandId]| {
            Value::List(ids.iter().map(|c| Value::Unsigned(c.0.into())).collect())
        };
        match attribute {
            ACCEPTED_COMMAND_LIST => Ok(command_list(&instance.accepted_commands)),
            GENERATED_COMMAND_LIST => Ok(command_list(&instance.generated_commands)),
            _ => instance
                .attribute(attribute)
                .map(|a| a.value.clone())
                .ok_or(ImStatus::UnsupportedAttribute),
        }
    }

    fn change_to_mode(cluster: &mut ClusterInstance, request: &CommandRequest) -> InvokeResponse {
        let Ok(ChangeToMode { new_mode }) = ChangeToMode::decode(request) else {
            return InvokeResponse::Status(ImStatus::InvalidCommand);
        };
        let supported = cluster
            .attribute(attributes::SUPPORTED_MODES)
            .and_then(|a| mwom::decode_supported_modes(&a.value).ok())
            .unwrap_or_default();

        let status = if supported.iter().any(|m| m.mode == new_mode) {
            if let Some(current) = cluster.attribute_mut(attributes::CURRENT_MODE) {
                current.value = Value::from(new_mode);
            }
            ModeChangeStatus::Success
        } else {
            ModeChangeStatus::UnsupportedMode
        };
        debug!(new_mode, ?status, "ChangeToMode handled");
        InvokeResponse::Command(
            ChangeToModeResponse {
                status,
                status_text: None,
            }
            .encode(),
        )
    }

    fn dispatch(
        endpoints: &mut [Endpoint],
        endpoint: EndpointId,
        request: &CommandRequest,
    ) -> InvokeResponse {
        let Some(ep) = endpoints.iter_mut().find(|ep| ep.id == endpoint.0) else {
            return InvokeResponse::Status(ImStatus::UnsupportedEndpoint);
        };
        let Some(cluster) = ep.cluster_mut(request.cluster) else {
            return InvokeResponse::Status(ImStatus::UnsupportedCluster);
        };
        if !cluster.accepts(request.command) {
            return InvokeResponse::Status(ImStatus::UnsupportedCommand);
        }
        match (request.cluster, request.command) {
            (mwom::CLUSTER_ID, commands::CHANGE_TO_MODE) => Self::change_to_mode(cluster, request),
            _ => InvokeResponse::Status(ImStatus::UnsupportedCommand),
        }
    }
}

#[async_trait]
impl DeviceController for SimulatedDevice {
    async fn read_attribute(
        &self,
        endpoint: EndpointId,
        cluster: ClusterId,
        attribute: AttributeId,
    ) -> Result<Value, TransportError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.ensure_reachable()?;
        trace!(%endpoint, %cluster, %attribute, "simulated read");
        Self::read(&self.lock(), endpoint, cluster, attribute).map_err(TransportError::Status)
    }

    async fn invoke(
        &self,
        endpoint: EndpointId,
        request: CommandRequest,
    ) -> Result<InvokeResponse, TransportError> {
        self.invokes.fetch_add(1, Ordering::SeqCst);
        self.ensure_reachable()?;
        trace!(%endpoint, cluster = %request.cluster, command = %request.command, "simulated invoke");
        if let Some(response) = self.canned.get(&(request.cluster, request.command)) {
            return Ok(response.clone());
        }
        Ok(Self::dispatch(&mut self.lock(), endpoint, &request))
    }
}
