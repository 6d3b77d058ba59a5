//! The bus application: registers for the report channels, files incoming
//! mail into the inbox and runs the pipeline on every tick.

use crate::bus::{BusClient, BusMessage, Registrar};
use crate::inbox::ReportInbox;
use crate::pipeline::ReportIngestPipeline;
use async_trait::async_trait;
use cotreport_client::{ClientConfig, Connector, ForwardingSession, TcpConnector};
use cotreport_core::config::{MillisPadding, ReporterConfig};
use cotreport_cot::{MillisFormat, TimestampGenerator};
use tracing::{debug, info};

/// Bus client that forwards node reports to a TAK server as CoT.
pub struct CotReporter<C: Connector> {
    inbox: ReportInbox,
    pipeline: ReportIngestPipeline<C>,
    local_channel: String,
    remote_channel: String,
}

impl CotReporter<TcpConnector> {
    /// Builds a reporter that connects over TCP to the configured server.
    pub fn from_config(config: &ReporterConfig) -> Self {
        let client = ClientConfig::from_transport(config.server_address(), &config.transport);
        Self::with_connector(TcpConnector::new(client), config)
    }
}

impl<C: Connector> CotReporter<C> {
    pub fn with_connector(connector: C, config: &ReporterConfig) -> Self {
        let pipeline = ReportIngestPipeline::new(
            ForwardingSession::new(connector),
            config.tak_uid_base.clone(),
            TimestampGenerator::new(millis_format(config.timestamps.millis)),
        );

        Self {
            inbox: ReportInbox::new(),
            pipeline,
            local_channel: config.bus.local_channel.clone(),
            remote_channel: config.bus.remote_channel.clone(),
        }
    }

    /// Handle to the pending reports.
    pub fn inbox(&self) -> &ReportInbox {
        &self.inbox
    }

    pub fn pipeline(&self) -> &ReportIngestPipeline<C> {
        &self.pipeline
    }
}

#[async_trait]
impl<C: Connector> BusClient for CotReporter<C> {
    fn on_connect(&mut self, registrar: &mut dyn Registrar) {
        registrar.register(&self.local_channel);
        registrar.register(&self.remote_channel);
        info!(
            local = %self.local_channel,
            remote = %self.remote_channel,
            "Registered for node reports"
        );
    }

    fn on_mail(&self, mail: &[BusMessage]) {
        let accepted = self
            .inbox
            .deliver(mail, &self.local_channel, &self.remote_channel);
        debug!(received = mail.len(), accepted, "New mail");
    }

    async fn on_tick(&mut self) {
        self.pipeline.tick(&self.inbox).await;
    }

    async fn on_shutdown(&mut self) {
        let metrics = self.pipeline.session().metrics().snapshot();
        info!(
            messages_sent = metrics.messages_sent,
            bytes_sent = metrics.bytes_sent,
            connect_failures = metrics.connect_failures,
            write_failures = metrics.write_failures,
            queued = self.pipeline.queue().len(),
            "Reporter stopping"
        );
        self.pipeline.shutdown().await;
    }
}

fn millis_format(padding: MillisPadding) -> MillisFormat {
    match padding {
        MillisPadding::Padded => MillisFormat::Padded,
        MillisPadding::Unpadded => MillisFormat::Unpadded,
    }
}
