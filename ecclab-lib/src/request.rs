//! JSON request/response contract for decoding frames received from a sender.
//!
//! A request names the algorithm and carries the received frame text:
//!
//! ```json
//! {"algo": "hamming", "trama": "1011001", "NumMensaje": 3}
//! ```
//!
//! `fletcher` additionally requires `block_size`. Handling a request never
//! fails; problems are reported in the response status and diagnostic.
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bits::BitSequence;
use crate::codec::Algorithm;
use crate::integrity::{DecodeResult, FixReport, Report, Status};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub algo: String,
    /// Received frame text.
    pub trama: String,
    #[serde(rename = "NumMensaje", default, skip_serializing_if = "Option::is_none")]
    pub num_mensaje: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_size: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "NumMensaje", skip_serializing_if = "Option::is_none")]
    pub num_mensaje: Option<u64>,
    pub algo: String,
    pub status: Status,
    pub data_bits: Option<String>,
    /// `data_bits` decoded as text, for `OK` and `FIX` results.
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syndrome: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

/// Decode the frame carried by `request`.
pub fn handle(request: &Request) -> Response {
    let algorithm = match Algorithm::from_name(&request.algo, request.block_size) {
        Ok(alg) => alg,
        Err(err) => {
            warn!(algo = %request.algo, "unsupported algorithm: {err}");
            return respond(request, DecodeResult::malformed(err).report());
        }
    };

    let report = match BitSequence::parse(&request.trama) {
        Ok(frame) => algorithm.report(&frame),
        Err(err) => DecodeResult::malformed(err).report(),
    };
    debug!(
        num = ?request.num_mensaje,
        algorithm = %algorithm,
        status = %report.status,
        "handled request"
    );
    respond(request, report)
}

fn respond(request: &Request, report: Report) -> Response {
    let message = match report.status {
        Status::Ok | Status::Fix => report
            .data_bits
            .as_deref()
            .and_then(|bits| BitSequence::parse(bits).ok())
            .map(|bits| bits.to_ascii()),
        _ => None,
    };
    Response {
        num_mensaje: request.num_mensaje,
        algo: request.algo.clone(),
        status: report.status,
        data_bits: report.data_bits,
        message,
        n: report.n,
        r: report.r,
        syndrome: report.syndrome,
        fix: report.fix,
        diagnostic: report.diagnostic,
    }
}

/// Parse a JSON request and handle it, serializing the response.
///
/// # Errors
/// If `line` is not a valid request.
pub fn handle_json(line: &str) -> serde_json::Result<String> {
    let request: Request = serde_json::from_str(line)?;
    serde_json::to_string(&handle(&request))
}
