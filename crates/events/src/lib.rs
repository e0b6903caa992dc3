// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod event_id;
mod eventbus;
mod principal;
mod request_id;
mod survey_event;
mod survey_id;
mod traits;

pub use event_id::*;
pub use eventbus::*;
pub use principal::*;
pub use request_id::*;
pub use survey_event::*;
pub use survey_id::*;
pub use traits::*;
