use super::{server_error, JwtSecret};
use crate::auth::authenticate;
use crate::db::{Database, NewOrderLine, OrderError};
use crate::models::order::OrderStatus;
use actix_web::{web, HttpRequest, HttpResponse};
use leptos::logging::log;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub lines: Vec<OrderLineRequest>,
}

#[derive(Serialize, Deserialize)]
pub struct PayOrderRequest {
    pub method: String,
}

#[derive(Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

fn order_error_response(context: &str, err: OrderError) -> HttpResponse {
    match err {
        OrderError::Empty => {
            HttpResponse::BadRequest().json(json!({ "message": "Order has no lines" }))
        }
        OrderError::BadQuantity(product_id) => HttpResponse::BadRequest().json(json!({
            "message": format!("Quantity must be positive for product {}", product_id),
        })),
        OrderError::UnknownProduct(product_id) => HttpResponse::NotFound().json(json!({
            "message": format!("Product {} not found", product_id),
        })),
        OrderError::InsufficientStock(product_id) => HttpResponse::BadRequest().json(json!({
            "message": format!("Not enough stock for product {}", product_id),
        })),
        OrderError::NotFound => {
            HttpResponse::NotFound().json(json!({ "message": "Order not found" }))
        }
        OrderError::InvalidTransition { current, requested } => {
            HttpResponse::BadRequest().json(json!({
                "message": format!("Order is {}, cannot move to {}", current, requested),
            }))
        }
        OrderError::Db(e) => server_error(context, e),
    }
}

pub async fn create_order(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    request: web::Json<CreateOrderRequest>,
) -> HttpResponse {
    let claims = match authenticate(&req, &secret.0) {
        Ok(claims) => claims,
        Err(e) => return e.error_response(),
    };

    let lines: Vec<NewOrderLine> = request
        .lines
        .iter()
        .map(|line| NewOrderLine {
            product_id: line.product_id,
            quantity: line.quantity,
        })
        .collect();
    log!("[API] Order submission by user {}: {} line(s)", claims.sub, lines.len());

    match db.create_order(claims.sub, &lines).await {
        Ok(order) => HttpResponse::Created().json(json!({
            "message": "Order placed",
            "order": order,
        })),
        Err(e) => order_error_response("create_order", e),
    }
}

pub async fn my_orders(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
) -> HttpResponse {
    let claims = match authenticate(&req, &secret.0) {
        Ok(claims) => claims,
        Err(e) => return e.error_response(),
    };
    match db.list_orders_for_user(claims.sub).await {
        Ok(orders) => HttpResponse::Ok().json(orders),
        Err(e) => server_error("my_orders", e),
    }
}

pub async fn list_all_orders(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
) -> HttpResponse {
    let claims = match authenticate(&req, &secret.0) {
        Ok(claims) => claims,
        Err(e) => return e.error_response(),
    };
    if !claims.is_admin() {
        return HttpResponse::Forbidden()
            .json(json!({ "message": "Insufficient permissions" }));
    }
    match db.list_all_orders().await {
        Ok(orders) => HttpResponse::Ok().json(orders),
        Err(e) => server_error("list_all_orders", e),
    }
}

pub async fn get_order(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    id: web::Path<i64>,
) -> HttpResponse {
    let claims = match authenticate(&req, &secret.0) {
        Ok(claims) => claims,
        Err(e) => return e.error_response(),
    };
    match db.get_order(id.into_inner()).await {
        Ok(Some(order)) if claims.may_act_for(order.user_id) => HttpResponse::Ok().json(order),
        Ok(Some(_)) => HttpResponse::Forbidden()
            .json(json!({ "message": "You can only view your own orders" })),
        Ok(None) => HttpResponse::NotFound().json(json!({ "message": "Order not found" })),
        Err(e) => server_error("get_order", e),
    }
}

pub async fn pay_order(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    id: web::Path<i64>,
    request: web::Json<PayOrderRequest>,
) -> HttpResponse {
    let claims = match authenticate(&req, &secret.0) {
        Ok(claims) => claims,
        Err(e) => return e.error_response(),
    };
    let order_id = id.into_inner();

    let order = match db.get_order(order_id).await {
        Ok(Some(order)) => order,
        Ok(None) => return HttpResponse::NotFound().json(json!({ "message": "Order not found" })),
        Err(e) => return server_error("pay_order", e),
    };
    if !claims.may_act_for(order.user_id) {
        return HttpResponse::Forbidden()
            .json(json!({ "message": "You can only pay for your own orders" }));
    }
    if request.method.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({ "message": "Payment method is required" }));
    }

    match db.pay_order(order_id, request.method.trim()).await {
        Ok(order) => HttpResponse::Ok().json(json!({
            "message": "Payment recorded",
            "order": order,
        })),
        Err(e) => order_error_response("pay_order", e),
    }
}

/// Fulfilment moves are admin work; cancelling a pending order is the one
/// transition the owner may request themselves.
pub async fn update_order_status(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    id: web::Path<i64>,
    request: web::Json<UpdateOrderStatusRequest>,
) -> HttpResponse {
    let claims = match authenticate(&req, &secret.0) {
        Ok(claims) => claims,
        Err(e) => return e.error_response(),
    };
    let order_id = id.into_inner();

    let next = match OrderStatus::parse(&request.status) {
        Some(status) => status,
        None => {
            return HttpResponse::BadRequest()
                .json(json!({ "message": format!("Unknown status '{}'", request.status) }))
        }
    };

    let order = match db.get_order(order_id).await {
        Ok(Some(order)) => order,
        Ok(None) => return HttpResponse::NotFound().json(json!({ "message": "Order not found" })),
        Err(e) => return server_error("update_order_status", e),
    };
    let allowed = if next == OrderStatus::Cancelled {
        claims.may_act_for(order.user_id)
    } else {
        claims.is_admin()
    };
    if !allowed {
        return HttpResponse::Forbidden()
            .json(json!({ "message": "Insufficient permissions" }));
    }

    match db.set_order_status(order_id, next).await {
        Ok(order) => HttpResponse::Ok().json(json!({
            "message": "Order updated",
            "order": order,
        })),
        Err(e) => order_error_response("update_order_status", e),
    }
}

pub async fn order_payments(
    req: HttpRequest,
    db: web::Data<Database>,
    secret: web::Data<JwtSecret>,
    id: web::Path<i64>,
) -> HttpResponse {
    let claims = match authenticate(&req, &secret.0) {
        Ok(claims) => claims,
        Err(e) => return e.error_response(),
    };
    let order_id = id.into_inner();

    let order = match db.get_order(order_id).await {
        Ok(Some(order)) => order,
        Ok(None) => return HttpResponse::NotFound().json(json!({ "message": "Order not found" })),
        Err(e) => return server_error("order_payments", e),
    };
    if !claims.may_act_for(order.user_id) {
        return HttpResponse::Forbidden()
            .json(json!({ "message": "You can only view your own orders" }));
    }

    match db.payments_for_order(order_id).await {
        Ok(payments) => HttpResponse::Ok().json(payments),
        Err(e) => server_error("order_payments", e),
    }
}
