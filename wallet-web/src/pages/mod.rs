//! Page modules - one per product surface

pub mod coin;
pub mod deposit;
pub mod insurance;
pub mod loan;
pub mod surface;

pub use coin::CoinPage;
pub use deposit::DepositPage;
pub use insurance::InsurancePage;
pub use loan::LoanPage;
