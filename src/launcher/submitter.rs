use futures::future::BoxFuture;
use kube::api::{DynamicObject, PostParams};
use kube::{Api, Client};
use tracing::{Instrument, trace_span};

use crate::kubernetes_objects::FIELD_MANAGER;
use crate::kubernetes_objects::spark_application::CustomResourceTarget;

/// Creates custom objects in the cluster.
pub trait CustomObjectSubmitter: Send + Sync {
    fn create<'a>(
        &'a self,
        object: &'a DynamicObject,
    ) -> BoxFuture<'a, Result<DynamicObject, kube::Error>>;
}

/// Submits through the cluster API with a namespaced dynamic client.
pub struct KubeSubmitter {
    api: Api<DynamicObject>,
    namespace: String,
}

impl KubeSubmitter {
    pub fn new(client: Client, target: &CustomResourceTarget) -> KubeSubmitter {
        KubeSubmitter {
            api: Api::namespaced_with(client, &target.namespace, &target.api_resource()),
            namespace: target.namespace.clone(),
        }
    }
}

impl CustomObjectSubmitter for KubeSubmitter {
    fn create<'a>(
        &'a self,
        object: &'a DynamicObject,
    ) -> BoxFuture<'a, Result<DynamicObject, kube::Error>> {
        let post_params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };
        let span = trace_span!(
            "create_custom_object",
            kubernetes_namespace = %self.namespace,
            object_name = object.metadata.name.as_deref().unwrap_or("<unnamed>")
        );
        Box::pin(async move { self.api.create(&post_params, object).await }.instrument(span))
    }
}
