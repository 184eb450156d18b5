// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use error::{ApiError, translate_core_error, translate_domain_error};
pub use handlers::{
    advance, apply_request, build_submission, build_wizard_view, retreat, select_geo_file,
    to_command,
};
pub use request_response::{
    CommandRequest, CreateSessionResponse, GeoFileRequest, GeoView, SubmitResponse,
    ValidityView, WizardView,
};
