pub mod payload;
pub mod referral;
pub mod tree;

pub use payload::{parse_generation, parse_generations, parse_generations_str};
pub use referral::{PackStatus, RecordId, ReferralRecord};
pub use tree::TreeNode;
