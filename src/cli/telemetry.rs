//! Logging on stderr plus an optional OTLP trace exporter.
//!
//! The exporter is configured from the standard `OTEL_*` variables and only
//! installed when `OTEL_EXPORTER_OTLP_ENDPOINT` is set. `rosterctl` runs one
//! command and exits, so `shutdown_tracer` must run before the process ends to
//! flush pending spans.

use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;
use opentelemetry::propagation::TextMapCompositePropagator;
use opentelemetry::{KeyValue, global, trace::TracerProvider as _};
use opentelemetry_otlp::{Compression, WithExportConfig, WithTonicConfig};
use opentelemetry_sdk::{
    Resource,
    propagation::{BaggagePropagator, TraceContextPropagator},
    trace::{SdkTracerProvider, Tracer},
};
use std::{env::var, time::Duration};
use tonic::{
    metadata::{Ascii, MetadataKey, MetadataMap, MetadataValue},
    transport::ClientTlsConfig,
};
use tracing::{Level, debug};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};
use ulid::Ulid;
use url::Url;

const ENV_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
const ENV_HEADERS: &str = "OTEL_EXPORTER_OTLP_HEADERS";
const ENV_PROTOCOL: &str = "OTEL_EXPORTER_OTLP_PROTOCOL";
const ENV_INSTANCE_ID: &str = "OTEL_SERVICE_INSTANCE_ID";

const EXPORT_TIMEOUT: Duration = Duration::from_secs(3);

static TRACER_PROVIDER: OnceCell<SdkTracerProvider> = OnceCell::new();

#[derive(Clone, Debug, PartialEq, Eq)]
struct ExporterConfig {
    endpoint: String,
    /// Set for `https` endpoints; gRPC over TLS needs the server name.
    tls_domain: Option<String>,
    headers: Vec<(String, String)>,
    instance_id: String,
}

impl ExporterConfig {
    /// `None` when no endpoint is configured.
    fn from_env() -> Option<Self> {
        let endpoint = var(ENV_ENDPOINT).ok()?;
        if let Ok(protocol) = var(ENV_PROTOCOL)
            && protocol != "grpc"
        {
            debug!("{ENV_PROTOCOL}='{protocol}' ignored: only grpc is supported");
        }
        Some(Self::new(
            &endpoint,
            var(ENV_HEADERS).ok().as_deref(),
            var(ENV_INSTANCE_ID).ok(),
        ))
    }

    fn new(endpoint: &str, headers: Option<&str>, instance_id: Option<String>) -> Self {
        let endpoint = endpoint.trim();
        let endpoint = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("https://{}", endpoint.trim_end_matches('/'))
        };

        let tls_domain = Url::parse(&endpoint)
            .ok()
            .filter(|url| url.scheme() == "https")
            .and_then(|url| url.host_str().map(str::to_string));

        Self {
            endpoint,
            tls_domain,
            headers: headers.map(parse_headers).unwrap_or_default(),
            instance_id: instance_id.unwrap_or_else(|| Ulid::new().to_string()),
        }
    }

    fn metadata(&self) -> Result<MetadataMap> {
        let mut meta = MetadataMap::with_capacity(self.headers.len());
        for (key, value) in &self.headers {
            let name = MetadataKey::<Ascii>::from_bytes(key.as_bytes())
                .map_err(|e| anyhow!("invalid {ENV_HEADERS} key {key}: {e}"))?;
            let value: MetadataValue<Ascii> = value
                .parse()
                .map_err(|e| anyhow!("invalid {ENV_HEADERS} value for {key}: {e}"))?;
            meta.insert(name, value);
        }
        Ok(meta)
    }

    fn resource(&self) -> Resource {
        Resource::builder_empty()
            .with_attributes(vec![
                KeyValue::new("service.name", env!("CARGO_PKG_NAME")),
                KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                KeyValue::new("service.instance.id", self.instance_id.clone()),
            ])
            .build()
    }
}

/// `k1=v1,k2=v2`; keys are lowercased, malformed pairs and binary (`-bin`)
/// keys are skipped.
fn parse_headers(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let key = key.trim().to_ascii_lowercase();
            if key.is_empty() {
                return None;
            }
            if key.ends_with("-bin") {
                debug!("skipping binary OTLP header {key}");
                return None;
            }
            Some((key, value.trim().to_string()))
        })
        .collect()
}

fn init_tracer(config: &ExporterConfig) -> Result<Tracer> {
    let mut builder = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.endpoint)
        .with_compression(Compression::Gzip)
        .with_timeout(EXPORT_TIMEOUT);

    if let Some(domain) = &config.tls_domain {
        builder = builder.with_tls_config(
            ClientTlsConfig::new()
                .domain_name(domain.clone())
                .with_native_roots(),
        );
    }
    if !config.headers.is_empty() {
        builder = builder.with_metadata(config.metadata()?);
    }

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(builder.build()?)
        .with_resource(config.resource())
        .build();

    let _ = TRACER_PROVIDER.set(provider.clone());
    global::set_tracer_provider(provider.clone());
    global::set_text_map_propagator(TextMapCompositePropagator::new(vec![
        Box::new(TraceContextPropagator::new()),
        Box::new(BaggagePropagator::new()),
    ]));

    Ok(provider.tracer(env!("CARGO_PKG_NAME")))
}

fn filter(verbosity_level: Level) -> Result<EnvFilter> {
    Ok(EnvFilter::builder()
        .with_default_directive(verbosity_level.into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("hyper_util=error".parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("opentelemetry_sdk=warn".parse()?))
}

/// Initialize logging and, when configured, the OTLP exporter.
///
/// # Errors
///
/// Returns an error if the exporter or subscriber cannot be installed
pub fn init(verbosity_level: Option<Level>) -> Result<()> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact();
    let filter = filter(verbosity_level.unwrap_or(Level::ERROR))?;

    if let Some(config) = ExporterConfig::from_env() {
        let otel_layer = tracing_opentelemetry::layer().with_tracer(init_tracer(&config)?);
        let subscriber = Registry::default()
            .with(fmt_layer)
            .with(otel_layer)
            .with(filter);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(fmt_layer).with(filter);
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

/// Flushes and shuts down the exporter (noop if it was never installed).
pub fn shutdown_tracer() {
    if let Some(provider) = TRACER_PROVIDER.get()
        && let Err(err) = provider.shutdown()
    {
        debug!("tracer provider shutdown failed: {err}");
    }
}
