// System overview endpoints

use crate::client::BackendClient;
use crate::error::Error;
use crate::models::{ActivityEntry, DeviceShare, OverviewStats, TrafficPoint};

impl BackendClient {
    /// `GET /api/overview/stats`
    pub async fn overview_stats(&self) -> Result<OverviewStats, Error> {
        let url = self.url("api/overview/stats")?;
        self.get(url).await
    }

    /// Recent traffic totals. The backend keeps the last seven samples.
    ///
    /// `GET /api/overview/traffic`
    pub async fn overview_traffic(&self) -> Result<Vec<TrafficPoint>, Error> {
        let url = self.url("api/overview/traffic")?;
        self.get(url).await
    }

    /// `GET /api/overview/devices`
    pub async fn overview_devices(&self) -> Result<Vec<DeviceShare>, Error> {
        let url = self.url("api/overview/devices")?;
        self.get(url).await
    }

    /// `GET /api/overview/activity`
    pub async fn overview_activity(&self) -> Result<Vec<ActivityEntry>, Error> {
        let url = self.url("api/overview/activity")?;
        self.get(url).await
    }
}
