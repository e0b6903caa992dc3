// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod manual_clock;
mod rig;
mod utils;

pub use manual_clock::*;
pub use rig::*;
pub use utils::*;
