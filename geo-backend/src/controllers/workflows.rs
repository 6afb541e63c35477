use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::{resolve_brand, storage_error};
use crate::models::{StepType, Workflow, WorkflowStep};
use crate::workflow::WorkflowExecutor;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/workflows")
            .route(web::get().to(list_workflows))
            .route(web::post().to(save_workflow)),
    );
    cfg.service(
        web::resource("/api/workflows/{id}")
            .route(web::get().to(get_workflow))
            .route(web::delete().to(delete_workflow)),
    );
    cfg.service(web::resource("/api/workflows/{id}/execute").route(web::post().to(execute)));
    cfg.service(web::resource("/api/workflows/{id}/executions").route(web::get().to(executions)));
}

#[derive(Deserialize)]
struct ListQuery {
    brand: Option<String>,
}

async fn list_workflows(state: web::Data<AppState>, query: web::Query<ListQuery>) -> impl Responder {
    match state.storage.list_workflows(query.brand.as_deref()) {
        Ok(workflows) => HttpResponse::Ok().json(workflows),
        Err(e) => storage_error(e),
    }
}

#[derive(Deserialize)]
struct StepBody {
    step_type: String,
    #[serde(default)]
    params: serde_json::Value,
}

#[derive(Deserialize)]
struct SaveWorkflowRequest {
    /// Present to overwrite an existing workflow
    id: Option<String>,
    name: String,
    brand: Option<String>,
    steps: Vec<StepBody>,
}

async fn save_workflow(
    state: web::Data<AppState>,
    body: web::Json<SaveWorkflowRequest>,
) -> impl Responder {
    if body.name.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "name must not be empty"
        }));
    }
    if body.steps.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "steps must not be empty"
        }));
    }
    let brand = match resolve_brand(&state, body.brand.as_deref()) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let mut steps = Vec::with_capacity(body.steps.len());
    for step in &body.steps {
        match StepType::from_str(&step.step_type) {
            Some(step_type) => steps.push(WorkflowStep {
                step_type,
                params: step.params.clone(),
            }),
            None => {
                return HttpResponse::BadRequest().json(serde_json::json!({
                    "error": format!("Unknown step type: {}", step.step_type)
                }))
            }
        }
    }

    let now = Utc::now();
    let workflow = match &body.id {
        Some(id) => match state.storage.get_workflow(id) {
            Ok(Some(existing)) => Workflow {
                id: existing.id,
                name: body.name.trim().to_string(),
                brand,
                steps,
                created_at: existing.created_at,
                updated_at: now,
            },
            Ok(None) => {
                return HttpResponse::NotFound().json(serde_json::json!({
                    "error": format!("Workflow not found: {}", id)
                }))
            }
            Err(e) => return storage_error(e),
        },
        None => Workflow {
            id: uuid::Uuid::new_v4().to_string(),
            name: body.name.trim().to_string(),
            brand,
            steps,
            created_at: now,
            updated_at: now,
        },
    };

    match state.storage.save_workflow(&workflow) {
        Ok(()) => HttpResponse::Ok().json(workflow),
        Err(e) => storage_error(e),
    }
}

async fn get_workflow(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match state.storage.get_workflow(&path) {
        Ok(Some(workflow)) => HttpResponse::Ok().json(workflow),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Workflow not found: {}", path)
        })),
        Err(e) => storage_error(e),
    }
}

async fn delete_workflow(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match state.storage.delete_workflow(&path) {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({ "deleted": true })),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Workflow not found: {}", path)
        })),
        Err(e) => storage_error(e),
    }
}

/// Run the workflow to completion and return the execution record. Step
/// results are also persisted, so the run shows up in the execution history.
async fn execute(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let workflow = match state.storage.get_workflow(&path) {
        Ok(Some(w)) => w,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": format!("Workflow not found: {}", path)
            }))
        }
        Err(e) => return storage_error(e),
    };

    let executor = WorkflowExecutor::new(state.storage.clone());
    match executor.execute(&workflow, &CancellationToken::new()).await {
        Ok(execution) => HttpResponse::Ok().json(execution),
        Err(e) => {
            log::error!("Workflow execution failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e }))
        }
    }
}

async fn executions(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match state.storage.list_workflow_executions(Some(&path)) {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => storage_error(e),
    }
}
