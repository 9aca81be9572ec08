use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use salesdesk_core::money::{require_non_negative, round2};
use salesdesk_core::text::{is_blank, require_not_blank};
use salesdesk_core::{DomainError, DomainResult, Entity, EntityMeta};

use crate::item::SaleItem;
use crate::payment::PaymentMethod;

/// Flat sales tax applied to the subtotal (9%).
pub const TAX_RATE: Decimal = Decimal::from_parts(9, 0, 0, false, 2);

/// Code and display name of a customer or seller, snapshotted on the sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub code: String,
    pub name: String,
}

impl Participant {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Settlement data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub method: PaymentMethod,
    pub card_number: Option<String>,
    pub amount_paid: Option<Decimal>,
}

/// Command: UpdateSale. Replaces seller, payment and the full item list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSale {
    pub seller: Participant,
    pub payment: Payment,
    pub items: Vec<SaleItem>,
}

/// Aggregate root: Sale.
///
/// Money figures are derived from the items on every read; nothing is cached.
/// Item lists whose figures would overflow never get in, so the getters
/// below cannot.
/// Customer and seller names are snapshots taken when the sale was recorded.
#[derive(Debug, Clone, Serialize)]
pub struct Sale {
    meta: EntityMeta,
    customer: Participant,
    seller: Participant,
    payment: Payment,
    items: Vec<SaleItem>,
}

impl Sale {
    pub fn new(
        code: &str,
        customer: Participant,
        seller: Participant,
        payment: Payment,
    ) -> DomainResult<Self> {
        let code = require_not_blank(code, "code cannot be empty")?;
        Self::build(EntityMeta::new(code), customer, seller, payment, Vec::new())
    }

    pub fn cash(
        code: &str,
        customer: Participant,
        seller: Participant,
        amount_paid: Option<Decimal>,
    ) -> DomainResult<Self> {
        let payment = Payment {
            method: PaymentMethod::Cash,
            card_number: None,
            amount_paid,
        };
        Self::new(code, customer, seller, payment)
    }

    pub fn credit_card(
        code: &str,
        customer: Participant,
        seller: Participant,
        card_number: impl Into<String>,
        amount_paid: Option<Decimal>,
    ) -> DomainResult<Self> {
        let payment = Payment {
            method: PaymentMethod::CreditCard,
            card_number: Some(card_number.into()),
            amount_paid,
        };
        Self::new(code, customer, seller, payment)
    }

    /// Rehydrates a stored sale. Field rules apply; the code and the
    /// item-count rule do not.
    pub fn restore(
        meta: EntityMeta,
        customer: Participant,
        seller: Participant,
        payment: Payment,
        items: Vec<SaleItem>,
    ) -> DomainResult<Self> {
        Self::build(meta, customer, seller, payment, items)
    }

    fn build(
        meta: EntityMeta,
        customer: Participant,
        seller: Participant,
        payment: Payment,
        items: Vec<SaleItem>,
    ) -> DomainResult<Self> {
        let customer = validate_participant(customer, "customer")?;
        let seller = validate_participant(seller, "seller")?;
        let payment = validate_payment(payment)?;
        check_totals(&items)?;
        Ok(Self {
            meta,
            customer,
            seller,
            payment,
            items,
        })
    }

    /// Appends a line. Rejected, leaving the sale as it was, when the new
    /// totals would overflow.
    pub fn add_item(&mut self, item: SaleItem) -> DomainResult<()> {
        self.items.push(item);
        if let Err(err) = check_totals(&self.items) {
            self.items.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Removes every line for `product_code`.
    pub fn remove_item(&mut self, product_code: &str) {
        self.items.retain(|item| item.product_code() != product_code);
    }

    /// Sum of line totals, rounded half-up to cents.
    pub fn subtotal(&self) -> Decimal {
        round2(self.items.iter().map(SaleItem::total_price).sum())
    }

    pub fn tax_amount(&self) -> Decimal {
        round2(self.subtotal() * TAX_RATE)
    }

    pub fn total_amount(&self) -> Decimal {
        round2(self.subtotal() + self.tax_amount())
    }

    /// Amount paid minus total, floored at zero; zero when nothing was paid.
    pub fn change(&self) -> Decimal {
        match self.payment.amount_paid {
            Some(paid) => round2(paid - self.total_amount()).max(round2(Decimal::ZERO)),
            None => round2(Decimal::ZERO),
        }
    }

    /// Checks the rules that only hold for a complete sale: at least one item
    /// and, for cash with a declared amount, enough money to cover the total.
    pub fn validate_sale(&self) -> DomainResult<()> {
        if self.items.is_empty() {
            return Err(DomainError::validation("sale must have at least one item"));
        }
        if self.payment.method == PaymentMethod::Cash {
            if let Some(paid) = self.payment.amount_paid {
                if paid < self.total_amount() {
                    return Err(DomainError::validation("amount paid is insufficient"));
                }
            }
        }
        Ok(())
    }

    /// Applies `cmd` and re-runs [`Sale::validate_sale`]. On any failure the
    /// sale keeps its previous seller, payment and items.
    pub fn update(&mut self, cmd: UpdateSale) -> DomainResult<()> {
        let seller = validate_participant(cmd.seller, "seller")?;
        let payment = validate_payment(cmd.payment)?;

        let previous = (
            std::mem::replace(&mut self.seller, seller),
            std::mem::replace(&mut self.payment, payment),
            std::mem::replace(&mut self.items, cmd.items),
        );

        if let Err(err) = check_totals(&self.items).and_then(|()| self.validate_sale()) {
            (self.seller, self.payment, self.items) = previous;
            return Err(err);
        }
        Ok(())
    }

    pub fn customer(&self) -> &Participant {
        &self.customer
    }

    pub fn seller(&self) -> &Participant {
        &self.seller
    }

    pub fn payment(&self) -> &Payment {
        &self.payment
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment.method
    }

    pub fn card_number(&self) -> Option<&str> {
        self.payment.card_number.as_deref()
    }

    /// `**** **** **** 1234`; shorter or absent numbers are returned as is.
    pub fn masked_card_number(&self) -> Option<String> {
        let card = self.payment.card_number.as_deref()?;
        let len = card.chars().count();
        if len < 4 {
            return Some(card.to_string());
        }
        let last4: String = card.chars().skip(len - 4).collect();
        Some(format!("**** **** **** {last4}"))
    }

    pub fn amount_paid(&self) -> Option<Decimal> {
        self.payment.amount_paid
    }

    pub fn items(&self) -> &[SaleItem] {
        &self.items
    }

    /// Sum of line quantities.
    pub fn total_items(&self) -> i64 {
        self.items.iter().map(SaleItem::quantity).sum()
    }
}

impl Entity for Sale {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

/// Runs the total getters' arithmetic with overflow checks.
fn check_totals(items: &[SaleItem]) -> DomainResult<()> {
    let too_large = || DomainError::validation("sale total is too large");

    let mut sum = Decimal::ZERO;
    let mut units: i64 = 0;
    for item in items {
        sum = sum.checked_add(item.total_price()).ok_or_else(too_large)?;
        units = units
            .checked_add(item.quantity())
            .ok_or_else(|| DomainError::validation("sale has too many units"))?;
    }

    let subtotal = round2(sum);
    let tax = round2(subtotal.checked_mul(TAX_RATE).ok_or_else(too_large)?);
    subtotal.checked_add(tax).ok_or_else(too_large)?;
    Ok(())
}

fn validate_participant(participant: Participant, role: &str) -> DomainResult<Participant> {
    Ok(Participant {
        code: require_not_blank(&participant.code, &format!("{role} code cannot be empty"))?,
        name: require_not_blank(&participant.name, &format!("{role} name cannot be empty"))?,
    })
}

fn validate_payment(payment: Payment) -> DomainResult<Payment> {
    if payment.method.requires_card_number() && is_blank(payment.card_number.as_deref()) {
        return Err(DomainError::validation(
            "card number is required for card payments",
        ));
    }
    require_non_negative(payment.amount_paid, "amount paid")?;
    Ok(payment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn customer() -> Participant {
        Participant::new("CUST0001", "Maria Souza")
    }

    fn seller() -> Participant {
        Participant::new("SELL01", "João Lima")
    }

    fn item(code: &str, quantity: i64, price: &str) -> SaleItem {
        SaleItem::new(code, "Produto", quantity, dec(price)).unwrap()
    }

    fn message(err: DomainError) -> String {
        match err {
            DomainError::Validation(m) => m,
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    fn sale_with(method: PaymentMethod, card: Option<&str>, paid: Option<&str>) -> DomainResult<Sale> {
        Sale::new(
            "SALE0001",
            customer(),
            seller(),
            Payment {
                method,
                card_number: card.map(str::to_string),
                amount_paid: paid.map(dec),
            },
        )
    }

    #[test]
    fn totals_for_reference_basket() {
        let mut sale = Sale::cash("SALE0001", customer(), seller(), Some(dec("100"))).unwrap();
        sale.add_item(item("P1", 2, "30.00")).unwrap();
        sale.add_item(item("P2", 1, "15.50")).unwrap();

        assert_eq!(sale.subtotal().to_string(), "75.50");
        assert_eq!(sale.tax_amount().to_string(), "6.80");
        assert_eq!(sale.total_amount().to_string(), "82.30");
        assert_eq!(sale.change().to_string(), "17.70");
        assert_eq!(sale.total_items(), 3);
        sale.validate_sale().unwrap();
    }

    #[test]
    fn empty_sale_totals_are_zero() {
        let sale = Sale::cash("SALE0001", customer(), seller(), None).unwrap();
        assert_eq!(sale.subtotal().to_string(), "0.00");
        assert_eq!(sale.total_amount().to_string(), "0.00");
        assert_eq!(sale.change().to_string(), "0.00");
    }

    #[test]
    fn change_is_zero_when_paid_is_absent_or_short() {
        let mut sale = Sale::cash("SALE0001", customer(), seller(), None).unwrap();
        sale.add_item(item("P1", 1, "10")).unwrap();
        assert_eq!(sale.change(), Decimal::ZERO);

        let mut pix = sale_with(PaymentMethod::Pix, None, Some("1.00")).unwrap();
        pix.add_item(item("P1", 1, "10")).unwrap();
        assert_eq!(pix.change(), Decimal::ZERO);
        pix.validate_sale().unwrap();
    }

    #[test]
    fn card_methods_require_card_number() {
        for method in PaymentMethod::ALL {
            let without = sale_with(method, None, None);
            let blank = sale_with(method, Some("   "), None);
            if method.requires_card_number() {
                assert_eq!(
                    message(without.unwrap_err()),
                    "card number is required for card payments"
                );
                assert!(blank.is_err());
            } else {
                assert!(without.is_ok());
                assert!(blank.is_ok());
            }
            // any method accepts a card number
            assert!(sale_with(method, Some("4111111111111111"), None).is_ok());
        }
    }

    #[test]
    fn header_fields_are_required() {
        assert_eq!(
            message(Sale::cash(" ", customer(), seller(), None).unwrap_err()),
            "code cannot be empty"
        );
        assert_eq!(
            message(
                Sale::cash("S", Participant::new("", "Maria"), seller(), None).unwrap_err()
            ),
            "customer code cannot be empty"
        );
        assert_eq!(
            message(Sale::cash("S", Participant::new("C1", " "), seller(), None).unwrap_err()),
            "customer name cannot be empty"
        );
        assert_eq!(
            message(Sale::cash("S", customer(), Participant::new("", "João"), None).unwrap_err()),
            "seller code cannot be empty"
        );
        assert_eq!(
            message(Sale::cash("S", customer(), Participant::new("S1", ""), None).unwrap_err()),
            "seller name cannot be empty"
        );
        assert_eq!(
            message(sale_with(PaymentMethod::Cash, None, Some("-0.01")).unwrap_err()),
            "amount paid cannot be negative"
        );
    }

    #[test]
    fn validate_sale_rules() {
        let sale = Sale::cash("S", customer(), seller(), None).unwrap();
        assert_eq!(message(sale.validate_sale().unwrap_err()), "sale must have at least one item");

        let mut short = Sale::cash("S", customer(), seller(), Some(dec("10.89"))).unwrap();
        short.add_item(item("P1", 1, "10")).unwrap();
        assert_eq!(message(short.validate_sale().unwrap_err()), "amount paid is insufficient");

        let mut exact = Sale::cash("S", customer(), seller(), Some(dec("10.90"))).unwrap();
        exact.add_item(item("P1", 1, "10")).unwrap();
        exact.validate_sale().unwrap();
        assert_eq!(exact.change(), Decimal::ZERO);

        let mut card =
            Sale::credit_card("S", customer(), seller(), "4111111111111111", Some(dec("1"))).unwrap();
        card.add_item(item("P1", 1, "10")).unwrap();
        card.validate_sale().unwrap();
    }

    #[test]
    fn remove_item_drops_every_line_for_product() {
        let mut sale = Sale::cash("S", customer(), seller(), None).unwrap();
        sale.add_item(item("P1", 1, "10")).unwrap();
        sale.add_item(item("P2", 1, "5")).unwrap();
        sale.add_item(item("P1", 2, "10")).unwrap();
        assert_eq!(sale.items().len(), 3);

        sale.remove_item("P1");
        assert_eq!(sale.items().len(), 1);
        assert_eq!(sale.items()[0].product_code(), "P2");

        sale.remove_item("missing");
        assert_eq!(sale.items().len(), 1);
    }

    #[test]
    fn masked_card_number() {
        let sale =
            Sale::credit_card("S", customer(), seller(), "4111111111111234", None).unwrap();
        assert_eq!(sale.masked_card_number().as_deref(), Some("**** **** **** 1234"));

        let short = sale_with(PaymentMethod::CreditCard, Some("123"), None).unwrap();
        assert_eq!(short.masked_card_number().as_deref(), Some("123"));

        let cash = Sale::cash("S", customer(), seller(), None).unwrap();
        assert_eq!(cash.masked_card_number(), None);
    }

    #[test]
    fn update_replaces_and_revalidates() {
        let mut sale = Sale::cash("S", customer(), seller(), Some(dec("50"))).unwrap();
        sale.add_item(item("P1", 1, "10")).unwrap();

        sale.update(UpdateSale {
            seller: Participant::new("SELL02", "Ana"),
            payment: Payment {
                method: PaymentMethod::DebitCard,
                card_number: Some("5555444433332222".into()),
                amount_paid: None,
            },
            items: vec![item("P9", 3, "7.25")],
        })
        .unwrap();

        assert_eq!(sale.seller().code, "SELL02");
        assert_eq!(sale.payment_method(), PaymentMethod::DebitCard);
        assert_eq!(sale.items().len(), 1);
        assert_eq!(sale.subtotal().to_string(), "21.75");
        assert_eq!(sale.customer().code, "CUST0001");
    }

    #[test]
    fn failed_update_restores_previous_state() {
        let mut sale = Sale::cash("S", customer(), seller(), Some(dec("50"))).unwrap();
        sale.add_item(item("P1", 1, "10")).unwrap();

        let err = sale
            .update(UpdateSale {
                seller: Participant::new("SELL02", "Ana"),
                payment: Payment {
                    method: PaymentMethod::Cash,
                    card_number: None,
                    amount_paid: Some(dec("1")),
                },
                items: vec![item("P9", 3, "7.25")],
            })
            .unwrap_err();
        assert_eq!(message(err), "amount paid is insufficient");
        assert_eq!(sale.seller().code, "SELL01");
        assert_eq!(sale.items()[0].product_code(), "P1");

        let err = sale
            .update(UpdateSale { seller: seller(), payment: Payment::default(), items: vec![] })
            .unwrap_err();
        assert_eq!(message(err), "sale must have at least one item");
        assert_eq!(sale.items().len(), 1);
    }

    #[test]
    fn restore_skips_code_and_item_rules() {
        let meta = EntityMeta::restore(Some(salesdesk_core::EntityId::new(1)), "", None);
        let sale = Sale::restore(meta, customer(), seller(), Payment::default(), vec![]).unwrap();
        assert_eq!(sale.code(), "");
        assert!(sale.validate_sale().is_err());
    }

    #[test]
    fn duplicate_product_lines_are_kept() {
        let mut sale = Sale::cash("S", customer(), seller(), None).unwrap();
        sale.add_item(item("P1", 1, "10")).unwrap();
        sale.add_item(item("P1", 1, "10")).unwrap();
        assert_eq!(sale.items().len(), 2);
        assert_eq!(sale.subtotal().to_string(), "20.00");
    }

    #[test]
    fn overflowing_totals_are_rejected() {
        // fits as a line, but subtotal plus 9% tax does not
        let near_max = dec("75000000000000000000000000000");
        let mut sale = Sale::cash("S", customer(), seller(), None).unwrap();
        sale.add_item(item("P1", 1, "10")).unwrap();

        let err = sale.add_item(SaleItem::new("P2", "Produto", 1, near_max).unwrap()).unwrap_err();
        assert_eq!(message(err), "sale total is too large");
        assert_eq!(sale.items().len(), 1);
        assert_eq!(sale.total_amount().to_string(), "10.90");

        let mut units = Sale::cash("S", customer(), seller(), None).unwrap();
        units.add_item(SaleItem::new("P1", "Produto", i64::MAX, dec("0.01")).unwrap()).unwrap();
        let err = units.add_item(item("P2", 1, "1")).unwrap_err();
        assert_eq!(message(err), "sale has too many units");
        assert_eq!(units.total_items(), i64::MAX);

        let err = Sale::restore(
            EntityMeta::restore(None, "S", None),
            customer(),
            seller(),
            Payment::default(),
            vec![
                SaleItem::new("P1", "Produto", 1, Decimal::MAX).unwrap(),
                SaleItem::new("P2", "Produto", 1, Decimal::MAX).unwrap(),
            ],
        )
        .unwrap_err();
        assert_eq!(message(err), "sale total is too large");
    }

    #[test]
    fn update_with_overflowing_items_restores_previous_state() {
        let mut sale = Sale::cash("S", customer(), seller(), None).unwrap();
        sale.add_item(item("P1", 1, "10")).unwrap();

        let err = sale
            .update(UpdateSale {
                seller: Participant::new("SELL02", "Ana"),
                payment: Payment::default(),
                items: vec![
                    SaleItem::new("P1", "Produto", 1, Decimal::MAX).unwrap(),
                    SaleItem::new("P2", "Produto", 1, Decimal::MAX).unwrap(),
                ],
            })
            .unwrap_err();
        assert_eq!(message(err), "sale total is too large");
        assert_eq!(sale.seller().code, "SELL01");
        assert_eq!(sale.subtotal().to_string(), "10.00");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn items_strategy() -> impl Strategy<Value = Vec<(i64, i64)>> {
            // (quantity, unit price in cents)
            prop::collection::vec((1i64..50, 1i64..100_000), 0..20)
        }

        fn build(lines: &[(i64, i64)], paid: Option<Decimal>) -> Sale {
            let mut sale = Sale::cash("SALE", customer(), seller(), paid).unwrap();
            for (i, (qty, cents)) in lines.iter().enumerate() {
                sale.add_item(
                    SaleItem::new(&format!("P{i}"), "Produto", *qty, Decimal::new(*cents, 2)).unwrap(),
                )
                .unwrap();
            }
            sale
        }

        proptest! {
            #![proptest_config(ProptestConfig { cases: 1000, ..ProptestConfig::default() })]

            #[test]
            fn subtotal_plus_tax_is_total(lines in items_strategy()) {
                let sale = build(&lines, None);
                prop_assert_eq!(sale.subtotal() + sale.tax_amount(), sale.total_amount());
                prop_assert_eq!(sale.tax_amount(), round2(sale.subtotal() * TAX_RATE));
                prop_assert_eq!(sale.total_amount().scale(), 2);
            }

            #[test]
            fn change_is_never_negative(lines in items_strategy(), paid_cents in proptest::option::of(0i64..10_000_000)) {
                let paid = paid_cents.map(|c| Decimal::new(c, 2));
                let sale = build(&lines, paid);
                let change = sale.change();
                prop_assert!(change >= Decimal::ZERO);
                match paid {
                    Some(p) if p > sale.total_amount() => prop_assert_eq!(change, p - sale.total_amount()),
                    _ => prop_assert_eq!(change, Decimal::ZERO),
                }
            }

            #[test]
            fn cash_sufficiency_matches_change(lines in items_strategy(), paid_cents in 0i64..10_000_000) {
                prop_assume!(!lines.is_empty());
                let sale = build(&lines, Some(Decimal::new(paid_cents, 2)));
                let sufficient = Decimal::new(paid_cents, 2) >= sale.total_amount();
                prop_assert_eq!(sale.validate_sale().is_ok(), sufficient);
            }
        }
    }
}
