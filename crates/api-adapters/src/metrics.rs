//! Prometheus registry exposed at `/metrics`.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RpcLabels {
    pub procedure: String,
    pub outcome: String,
}

pub struct Metrics {
    registry: Registry,
    rpc_requests: Family<RpcLabels, Counter>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let rpc_requests = Family::<RpcLabels, Counter>::default();
        registry.register("rpc_requests", "RPC calls by procedure and outcome", rpc_requests.clone());
        Self { registry, rpc_requests }
    }

    pub fn observe(&self, procedure: &str, outcome: &str) {
        self.rpc_requests
            .get_or_create(&RpcLabels { procedure: procedure.to_string(), outcome: outcome.to_string() })
            .inc();
    }

    /// OpenMetrics text exposition.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        encode(&mut out, &self.registry)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_labelled_by_procedure_and_outcome() {
        let metrics = Metrics::new();
        metrics.observe("products.list", "OK");
        metrics.observe("products.list", "OK");
        metrics.observe("products.create", "FORBIDDEN");

        let text = metrics.render().unwrap();
        assert!(text.contains(r#"rpc_requests_total{procedure="products.list",outcome="OK"} 2"#));
        assert!(text.contains(r#"rpc_requests_total{procedure="products.create",outcome="FORBIDDEN"} 1"#));
    }
}
