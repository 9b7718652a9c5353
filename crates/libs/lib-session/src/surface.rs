//! # Product Surfaces
//!
//! Each panel of the app (deposit, loan, insurance, coin purchase) is described by
//! a static [`SurfaceSpec`]: the balances it shows and the operations it offers.
//! The controller and the views are generic over this table.

use std::fmt;

use crate::contracts::ContractKind;
use crate::region::RegionCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    Deposit,
    Loan,
    Insurance,
    CoinPurchase,
}

impl SurfaceKind {
    pub const ALL: [SurfaceKind; 4] = [
        SurfaceKind::Deposit,
        SurfaceKind::Loan,
        SurfaceKind::Insurance,
        SurfaceKind::CoinPurchase,
    ];

    pub fn spec(&self) -> &'static SurfaceSpec {
        match self {
            SurfaceKind::Deposit => &DEPOSIT_SURFACE,
            SurfaceKind::Loan => &LOAN_SURFACE,
            SurfaceKind::Insurance => &INSURANCE_SURFACE,
            SurfaceKind::CoinPurchase => &COIN_PURCHASE_SURFACE,
        }
    }
}

/// Where a balance is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceSource {
    /// `eth_getBalance` of the account.
    Native,
    /// A `(address) -> uint256` getter on a contract.
    Contract(ContractKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BalanceField {
    Native,
    Coin,
    Deposit,
    Loan,
    Premium,
}

impl BalanceField {
    pub fn label(&self) -> &'static str {
        match self {
            BalanceField::Native => "ETH Balance",
            BalanceField::Coin => "PYC Balance",
            BalanceField::Deposit => "Deposit Balance",
            BalanceField::Loan => "Loan Balance",
            BalanceField::Premium => "Premium Balance",
        }
    }

    pub fn source(&self) -> BalanceSource {
        match self {
            BalanceField::Native => BalanceSource::Native,
            BalanceField::Coin => BalanceSource::Contract(ContractKind::Coin),
            BalanceField::Deposit | BalanceField::Loan => BalanceSource::Contract(ContractKind::Bank),
            BalanceField::Premium => BalanceSource::Contract(ContractKind::Insurance),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Deposit,
    Withdraw,
    Borrow,
    Repay,
    ExchangeToCoin,
    CreateInsurance,
    CancelInsurance,
    ForceCancelAll,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Deposit => "deposit",
            OperationKind::Withdraw => "withdraw",
            OperationKind::Borrow => "borrow",
            OperationKind::Repay => "repay",
            OperationKind::ExchangeToCoin => "exchange-to-coin",
            OperationKind::CreateInsurance => "create-insurance-contract",
            OperationKind::CancelInsurance => "cancel-insurance-contract",
            OperationKind::ForceCancelAll => "force-cancel-all-contracts",
        };
        f.write_str(name)
    }
}

/// How an operation's amount is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountSemantics {
    None,
    /// The panel's amount field.
    Entered,
    /// The configured coin purchase amount.
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequencing {
    Single,
    /// Grant the bank a PIYO allowance, then call the method. The second call is
    /// only issued after the first succeeds.
    AllowanceThenCall,
}

/// One row of the operation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSpec {
    pub kind: OperationKind,
    pub label: &'static str,
    pub contract: ContractKind,
    pub method: &'static str,
    pub amount: AmountSemantics,
    /// Whether the amount travels as the transaction value.
    pub payable: bool,
    /// Whether the operation needs a civic code.
    pub needs_region: bool,
    /// Staged in a confirmation dialog before sending.
    pub confirm: bool,
    pub owner_only: bool,
    pub sequencing: Sequencing,
}

impl OperationSpec {
    const fn single(kind: OperationKind, label: &'static str, contract: ContractKind, method: &'static str) -> Self {
        Self {
            kind,
            label,
            contract,
            method,
            amount: AmountSemantics::None,
            payable: false,
            needs_region: false,
            confirm: false,
            owner_only: false,
            sequencing: Sequencing::Single,
        }
    }

    const fn payable_with_dialog(kind: OperationKind, label: &'static str, contract: ContractKind, method: &'static str) -> Self {
        Self {
            amount: AmountSemantics::Entered,
            payable: true,
            confirm: true,
            ..Self::single(kind, label, contract, method)
        }
    }

    /// Success text for the message dialog.
    pub fn success_message(&self, amount: Option<&str>, region: Option<&RegionCode>, status: bool) -> String {
        let amount = amount.unwrap_or("0");
        match self.kind {
            OperationKind::Deposit => format!("Deposited {} ether.", amount),
            OperationKind::Borrow => format!("Borrowed {} ether.", amount),
            OperationKind::ExchangeToCoin => format!("Exchanged {} ETH for PIYO coin.", amount),
            OperationKind::CreateInsurance => match region {
                Some(region) => format!(
                    "Joined earthquake insurance for region {} with {} ether.",
                    region, amount
                ),
                None => format!("Joined earthquake insurance with {} ether.", amount),
            },
            OperationKind::Withdraw => format!("Withdrawn. status = {}", status),
            OperationKind::Repay => format!("Repaid. status = {}", status),
            OperationKind::CancelInsurance => format!("Insurance cancelled. status = {}", status),
            OperationKind::ForceCancelAll => format!(
                "All contracts cancelled and proceeds collected. status = {}",
                status
            ),
        }
    }
}

/// Declarative description of one product panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSpec {
    pub kind: SurfaceKind,
    pub title: &'static str,
    pub balances: &'static [BalanceField],
    pub primary: OperationSpec,
    pub secondary: Option<OperationSpec>,
    pub owner_action: Option<OperationSpec>,
    /// Prompt shown above the amount field in the confirmation dialog.
    pub amount_prompt: &'static str,
    /// Show the insurance owner and agreement list.
    pub shows_insurance_board: bool,
}

impl SurfaceSpec {
    pub fn operations(&self) -> impl Iterator<Item = &OperationSpec> {
        std::iter::once(&self.primary)
            .chain(self.secondary.as_ref())
            .chain(self.owner_action.as_ref())
    }

    pub fn operation(&self, kind: OperationKind) -> Option<&OperationSpec> {
        self.operations().find(|op| op.kind == kind)
    }
}

pub static DEPOSIT_SURFACE: SurfaceSpec = SurfaceSpec {
    kind: SurfaceKind::Deposit,
    title: "Deposit & Withdraw",
    balances: &[BalanceField::Native, BalanceField::Coin, BalanceField::Deposit],
    primary: OperationSpec::payable_with_dialog(OperationKind::Deposit, "Deposit", ContractKind::Bank, "deposit"),
    secondary: Some(OperationSpec::single(OperationKind::Withdraw, "Withdraw", ContractKind::Bank, "withdraw")),
    owner_action: None,
    amount_prompt: "Enter the amount to deposit, in ether.",
    shows_insurance_board: false,
};

pub static LOAN_SURFACE: SurfaceSpec = SurfaceSpec {
    kind: SurfaceKind::Loan,
    title: "Loan & Repay",
    balances: &[BalanceField::Native, BalanceField::Coin, BalanceField::Loan],
    primary: OperationSpec::payable_with_dialog(OperationKind::Borrow, "Borrow", ContractKind::Bank, "loan"),
    secondary: Some(OperationSpec {
        amount: AmountSemantics::Entered,
        sequencing: Sequencing::AllowanceThenCall,
        ..OperationSpec::single(OperationKind::Repay, "Repay", ContractKind::Bank, "pay")
    }),
    owner_action: None,
    amount_prompt: "Enter the amount to borrow, in ether.",
    shows_insurance_board: false,
};

pub static INSURANCE_SURFACE: SurfaceSpec = SurfaceSpec {
    kind: SurfaceKind::Insurance,
    title: "Earthquake Insurance",
    balances: &[BalanceField::Native, BalanceField::Premium],
    primary: OperationSpec {
        needs_region: true,
        ..OperationSpec::payable_with_dialog(
            OperationKind::CreateInsurance,
            "Buy Insurance",
            ContractKind::Insurance,
            "createContract",
        )
    },
    secondary: Some(OperationSpec::single(
        OperationKind::CancelInsurance,
        "Cancel Insurance",
        ContractKind::Insurance,
        "withdrawContract",
    )),
    owner_action: Some(OperationSpec {
        owner_only: true,
        ..OperationSpec::single(
            OperationKind::ForceCancelAll,
            "Cancel All Contracts",
            ContractKind::Insurance,
            "exodusContract",
        )
    }),
    amount_prompt: "Select your municipality and enter the premium, in ether.",
    shows_insurance_board: true,
};

pub static COIN_PURCHASE_SURFACE: SurfaceSpec = SurfaceSpec {
    kind: SurfaceKind::CoinPurchase,
    title: "Buy PIYO Coin",
    balances: &[BalanceField::Native, BalanceField::Coin],
    primary: OperationSpec {
        amount: AmountSemantics::Fixed,
        payable: true,
        ..OperationSpec::single(OperationKind::ExchangeToCoin, "Buy PIYO", ContractKind::Bank, "change2piyo")
    },
    secondary: None,
    owner_action: None,
    amount_prompt: "",
    shows_insurance_board: false,
};
