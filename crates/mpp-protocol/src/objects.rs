//! Well-known object dictionary entries (CiA 402 drive profile).

use crate::commands::ObjectAddress;

/// Statusword, UNSIGNED16.
pub const STATUSWORD: ObjectAddress = ObjectAddress::new(0x6041, 0x00);

/// Position actual value, INTEGER32, in encoder increments.
pub const POSITION_ACTUAL_VALUE: ObjectAddress = ObjectAddress::new(0x6064, 0x00);
