// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod clock;
mod error;
mod messages;
mod registry;
mod survey;

pub use clock::*;
pub use error::*;
pub use messages::*;
pub use registry::*;
pub use survey::*;
