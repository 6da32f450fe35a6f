use serde::Serialize;
use utoipa::ToSchema;

use crate::models::OrderWithItems;

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<OrderWithItems>)]
    pub items: Vec<OrderWithItems>,
}
