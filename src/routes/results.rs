use axum::extract::{Query, State};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::services::{formatter, results};

#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    #[serde(rename = "predictionId")]
    pub prediction_id: Option<String>,
}

/// GET /results/?predictionId=<id>: called by the detection worker once a prediction is
/// stored. Sends the summary to the originating chat and always answers "Ok".
pub async fn deliver_results(
    State(state): State<AppState>,
    Query(query): Query<ResultsQuery>,
) -> &'static str {
    let Some(prediction_id) = query.prediction_id.filter(|id| !id.is_empty()) else {
        tracing::warn!("Results request without predictionId");
        return "Ok";
    };

    let Some(record) = results::fetch_result(state.results.as_ref(), &prediction_id).await else {
        metrics::counter!("relay_results_missing_total").increment(1);
        return "Ok";
    };

    let summary = formatter::format_detections(&record);
    match state.messenger.send_text(record.chat_id, &summary).await {
        Ok(_) => {
            metrics::counter!("relay_results_delivered_total").increment(1);
            tracing::info!(
                prediction_id = %prediction_id,
                chat_id = record.chat_id,
                "Detection results sent"
            );
        }
        Err(e) => {
            tracing::error!(
                prediction_id = %prediction_id,
                chat_id = record.chat_id,
                error = %e,
                "Failed to send detection results"
            );
        }
    }
    "Ok"
}
