//! Read-only analytics endpoints backing the dashboards.

use lectavera_types::{ActivityData, DashboardStats, StudyCalendarDay, WeakArea};

use crate::{ApiClient, Result};

impl ApiClient {
    pub async fn dashboard_stats(&self, time_range: Option<&str>) -> Result<DashboardStats> {
        let mut req = self.http().get(self.endpoint("/analytics/dashboard"));
        if let Some(range) = time_range {
            req = req.query(&[("time_range", range)]);
        }
        self.send_json(req).await
    }

    pub async fn activity(&self, time_range: Option<&str>) -> Result<ActivityData> {
        let mut req = self.http().get(self.endpoint("/analytics/activity"));
        if let Some(range) = time_range {
            req = req.query(&[("time_range", range)]);
        }
        self.send_json(req).await
    }

    pub async fn weak_areas(&self) -> Result<Vec<WeakArea>> {
        self.send_json(self.http().get(self.endpoint("/analytics/weak-areas")))
            .await
    }

    pub async fn study_calendar(&self) -> Result<Vec<StudyCalendarDay>> {
        self.send_json(self.http().get(self.endpoint("/analytics/study-calendar")))
            .await
    }
}
