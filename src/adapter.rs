//! JSON request layer in front of the [`MatchingEngine`].
//!
//! One request per line, tagged by `op`:
//!
//! ```json
//! {"op":"limit_sell","asset":"HYPE","price":"0.40","shares":"10"}
//! {"op":"limit_buy","asset":"HYPE","price":"0.40","notional":"2.00"}
//! {"op":"market_buy","asset":"HYPE","notional":"15"}
//! {"op":"market_sell","asset":"FLOP","shares":"50"}
//! {"op":"open_orders"}
//! ```
//!
//! Every request gets a [`Response`] with an HTTP-style status: `201` for
//! anything that creates an order or trades, `200` for reads, `400` for
//! malformed requests and engine rejections.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::engine::MatchingEngine;
use crate::error::EngineError;
use crate::types::{Asset, Side};

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_INTERNAL: u16 = 500;

const DEFAULT_DEPTH_LEVELS: usize = 10;

fn default_depth_levels() -> usize {
    DEFAULT_DEPTH_LEVELS
}

/// A decoded request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    LimitBuy {
        asset: Asset,
        price: Decimal,
        notional: Decimal,
    },
    LimitSell {
        asset: Asset,
        price: Decimal,
        shares: Decimal,
    },
    MarketBuy {
        asset: Asset,
        notional: Decimal,
    },
    /// Market buy restricted to the complementary asset's bids
    CrossBuy {
        asset: Asset,
        notional: Decimal,
    },
    MarketSell {
        asset: Asset,
        shares: Decimal,
    },
    OpenOrders,
    Depth {
        asset: Asset,
        side: Side,
        #[serde(default = "default_depth_levels")]
        levels: usize,
    },
    StateRoot,
}

impl Request {
    /// Does this request create orders or trades?
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            Request::OpenOrders | Request::Depth { .. } | Request::StateRoot
        )
    }
}

/// Status code plus JSON body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub fn ok(body: Value) -> Self {
        Self { status: STATUS_OK, body }
    }

    pub fn created(body: Value) -> Self {
        Self {
            status: STATUS_CREATED,
            body,
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.status < STATUS_BAD_REQUEST
    }
}

impl From<AdapterError> for Response {
    fn from(err: AdapterError) -> Self {
        Self {
            status: err.status(),
            body: json!({ "error": err.to_string() }),
        }
    }
}

/// Failures surfaced to the client
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Malformed JSON, unknown `op`, missing or mistyped fields
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A result could not be rendered as JSON
    #[error("Failed to render response: {0}")]
    Render(#[source] serde_json::Error),
}

impl AdapterError {
    pub fn status(&self) -> u16 {
        match self {
            AdapterError::BadRequest(_) | AdapterError::Engine(_) => STATUS_BAD_REQUEST,
            AdapterError::Render(_) => STATUS_INTERNAL,
        }
    }
}

/// Decode one request line
pub fn parse(line: &str) -> Result<Request, AdapterError> {
    serde_json::from_str(line).map_err(|err| AdapterError::BadRequest(err.to_string()))
}

/// Decode, execute and render one request line
pub fn handle(engine: &mut MatchingEngine, line: &str) -> Response {
    parse(line)
        .and_then(|request| execute(engine, request))
        .unwrap_or_else(Response::from)
}

/// Run a decoded request against the engine
pub fn execute(engine: &mut MatchingEngine, request: Request) -> Result<Response, AdapterError> {
    let write = request.is_write();

    let body = match request {
        Request::LimitBuy {
            asset,
            price,
            notional,
        } => render(&engine.place_limit_buy(asset, price, notional)?)?,
        Request::LimitSell {
            asset,
            price,
            shares,
        } => render(&engine.place_limit_sell(asset, price, shares)?)?,
        Request::MarketBuy { asset, notional } => render(&engine.market_buy(asset, notional)?)?,
        Request::CrossBuy { asset, notional } => render(&engine.cross_buy(asset, notional)?)?,
        Request::MarketSell { asset, shares } => render(&engine.market_sell(asset, shares)?)?,
        Request::OpenOrders => render(&engine.list_open_orders())?,
        Request::Depth {
            asset,
            side,
            levels,
        } => render(&engine.depth(asset, side, levels))?,
        Request::StateRoot => json!({ "stateRoot": hex::encode(engine.state_root()) }),
    };

    Ok(if write {
        Response::created(body)
    } else {
        Response::ok(body)
    })
}

fn render<T: Serialize>(value: &T) -> Result<Value, AdapterError> {
    serde_json::to_value(value).map_err(AdapterError::Render)
}

// ============================================================================
// Unit Tests
// ============================================================================
