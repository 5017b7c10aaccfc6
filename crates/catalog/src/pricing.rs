//! Caller-specific price visibility.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use agrocat_accounts::{CallerContext, PricingTier};
use agrocat_core::{DomainError, DomainResult};

use crate::product::{PriceLadder, Product};

/// Which visibility rule produced a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceRule {
    GuestVisible,
    GuestHidden,
    VerifiedVip,
    VerifiedWholesale,
    Standard,
}

/// The single price a caller may see for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub price: Option<Decimal>,
    pub visible: bool,
    pub rule: PriceRule,
}

impl PriceQuote {
    fn shown(price: Decimal, rule: PriceRule) -> Self {
        Self {
            price: Some(price),
            visible: true,
            rule,
        }
    }

    fn hidden() -> Self {
        Self {
            price: None,
            visible: false,
            rule: PriceRule::GuestHidden,
        }
    }

    pub fn into_visible(self) -> DomainResult<Decimal> {
        match self.price {
            Some(price) if self.visible => Ok(price),
            _ => Err(DomainError::permission_denied(
                "price is only available to signed-in customers",
            )),
        }
    }
}

/// Computes [`PriceQuote`]s. Stateless; the caller context must be read fresh
/// for every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceVisibilityResolver;

impl PriceVisibilityResolver {
    /// First matching rule wins:
    ///
    /// 1. anonymous or guest-tier caller: `retail ?? base` if the product is
    ///    visible to unauthenticated callers, hidden otherwise
    /// 2. verified business on `vip`: `wholesale ?? base`
    /// 3. verified business on `wholesale`: `wholesale ?? retail ?? base`
    /// 4. everyone else: `retail ?? base`
    pub fn resolve(product: &Product, caller: &CallerContext) -> PriceQuote {
        let ladder = &product.pricing;
        let standard = ladder.retail().unwrap_or(ladder.base());

        if caller.is_guest() {
            return if product.visible_to_unauthenticated {
                PriceQuote::shown(standard, PriceRule::GuestVisible)
            } else {
                PriceQuote::hidden()
            };
        }

        match caller.verified_pricing_tier() {
            Some(PricingTier::Vip) => PriceQuote::shown(
                ladder.wholesale().unwrap_or(ladder.base()),
                PriceRule::VerifiedVip,
            ),
            Some(PricingTier::Wholesale) => PriceQuote::shown(
                ladder.wholesale().or(ladder.retail()).unwrap_or(ladder.base()),
                PriceRule::VerifiedWholesale,
            ),
            Some(PricingTier::Retail) | None => PriceQuote::shown(standard, PriceRule::Standard),
        }
    }
}

/// Whole-unit projection of a USD price into the display currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayPrice {
    pub usd: Option<Decimal>,
    pub uzs: Option<i64>,
}

/// Fixed-rate secondary-currency projection. Formatting only: it runs after
/// resolution and never feeds back into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyProjection {
    rate: Decimal,
}

impl CurrencyProjection {
    /// Default UZS per USD.
    pub const DEFAULT_RATE: Decimal = Decimal::from_parts(12800, 0, 0, false, 0);

    pub fn new(rate: Decimal) -> DomainResult<Self> {
        if rate <= Decimal::ZERO {
            return Err(DomainError::validation("conversion rate must be positive"));
        }
        Ok(Self { rate })
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn project(&self, quote: &PriceQuote) -> DisplayPrice {
        let usd = quote.price.filter(|_| quote.visible);
        DisplayPrice {
            usd,
            uzs: usd
                .and_then(|p| p.checked_mul(self.rate))
                .and_then(|v| v.trunc().to_i64()),
        }
    }
}

impl Default for CurrencyProjection {
    fn default() -> Self {
        Self {
            rate: Self::DEFAULT_RATE,
        }
    }
}

/// Full ladder for the product detail view, disclosed only with a visible quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    pub show_to_guests: bool,
    pub can_see_price: bool,
    pub base_usd: Option<Decimal>,
    pub retail_usd: Option<Decimal>,
    pub wholesale_usd: Option<Decimal>,
    pub user_price: DisplayPrice,
}

impl PriceBreakdown {
    pub fn new(product: &Product, quote: &PriceQuote, projection: &CurrencyProjection) -> Self {
        let ladder: Option<&PriceLadder> = quote.visible.then_some(&product.pricing);
        Self {
            show_to_guests: product.visible_to_unauthenticated,
            can_see_price: quote.visible,
            base_usd: ladder.map(PriceLadder::base),
            retail_usd: ladder.and_then(PriceLadder::retail),
            wholesale_usd: ladder.and_then(PriceLadder::wholesale),
            user_price: projection.project(quote),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use agrocat_accounts::{
        Account, AccountTier, CompanyRecord, TaxId, VerificationRecord, VerificationState,
    };
    use agrocat_core::{AccountId, LocalizedText};

    use super::*;
    use crate::product::{Brand, Category};

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn product(ladder: PriceLadder, guests: bool) -> Product {
        let category = Category::new("tractors", LocalizedText::ru("Тракторы"));
        let brand = Brand::new("yto", "YTO", "China");
        Product::new(
            "YTO-1204",
            "yto-1204",
            LocalizedText::ru("Трактор YTO 1204"),
            category.to_ref(),
            brand.to_ref(),
            ladder,
            Utc::now(),
        )
        .unwrap()
        .visible_to_guests(guests)
    }

    fn full_ladder() -> PriceLadder {
        PriceLadder::new(d(100), Some(d(120)), Some(d(90))).unwrap()
    }

    fn caller(tier: AccountTier, pricing: Option<PricingTier>) -> CallerContext {
        let mut account = Account::new(AccountId::new(), "user", tier);
        if let Some(pricing) = pricing {
            let company = CompanyRecord {
                tax_id: TaxId::parse("123456789").unwrap(),
                company_name: "ООО \"АгроТех Ферма\"".to_string(),
                legal_address: "г. Ташкент".to_string(),
                vat_payer: true,
                status: "active".to_string(),
            };
            account = account.with_verification(VerificationState::Verified {
                record: VerificationRecord::from_company(&company, Utc::now(), pricing),
            });
        }
        CallerContext::authenticated(&account)
    }

    #[test]
    fn guest_sees_retail_only_when_product_allows() {
        let anon = CallerContext::anonymous();
        let quote = PriceVisibilityResolver::resolve(&product(full_ladder(), true), &anon);
        assert_eq!(quote.price, Some(d(120)));
        assert_eq!(quote.rule, PriceRule::GuestVisible);

        let quote = PriceVisibilityResolver::resolve(&product(full_ladder(), false), &anon);
        assert_eq!(quote.price, None);
        assert!(!quote.visible);
    }

    #[test]
    fn signed_in_guest_tier_is_treated_as_guest() {
        let quote = PriceVisibilityResolver::resolve(
            &product(full_ladder(), false),
            &caller(AccountTier::Guest, None),
        );
        assert!(!quote.visible);
    }

    #[test]
    fn vip_gets_wholesale_or_base_never_retail() {
        let vip = caller(AccountTier::Business, Some(PricingTier::Vip));
        assert_eq!(PriceVisibilityResolver::resolve(&product(full_ladder(), false), &vip).price, Some(d(90)));

        let no_wholesale = PriceLadder::new(d(100), Some(d(120)), None).unwrap();
        assert_eq!(PriceVisibilityResolver::resolve(&product(no_wholesale, false), &vip).price, Some(d(100)));
    }

    #[test]
    fn wholesale_falls_back_through_retail_to_base() {
        let wholesale = caller(AccountTier::Business, Some(PricingTier::Wholesale));
        let no_wholesale = PriceLadder::new(d(100), Some(d(120)), None).unwrap();
        assert_eq!(
            PriceVisibilityResolver::resolve(&product(no_wholesale, false), &wholesale).price,
            Some(d(120))
        );
        let base_only = PriceLadder::base_only(d(100)).unwrap();
        assert_eq!(
            PriceVisibilityResolver::resolve(&product(base_only, false), &wholesale).price,
            Some(d(100))
        );
    }

    #[test]
    fn unverified_business_and_other_tiers_get_standard_price() {
        for tier in [
            AccountTier::Individual,
            AccountTier::Business,
            AccountTier::Dealer,
            AccountTier::Admin,
            AccountTier::Unrecognized,
        ] {
            let quote = PriceVisibilityResolver::resolve(&product(full_ladder(), false), &caller(tier, None));
            assert_eq!(quote.price, Some(d(120)), "{tier:?}");
            assert_eq!(quote.rule, PriceRule::Standard);
        }
    }

    #[test]
    fn verified_record_on_non_business_tier_does_not_escalate() {
        let dealer = caller(AccountTier::Dealer, Some(PricingTier::Vip));
        assert_eq!(
            PriceVisibilityResolver::resolve(&product(full_ladder(), false), &dealer).price,
            Some(d(120))
        );
    }

    #[test]
    fn projection_truncates_to_whole_units() {
        let projection = CurrencyProjection::default();
        let quote = PriceQuote::shown(Decimal::new(1999, 2), PriceRule::Standard);
        let display = projection.project(&quote);
        assert_eq!(display.usd, Some(Decimal::new(1999, 2)));
        assert_eq!(display.uzs, Some(255_872));
        assert_eq!(projection.project(&PriceQuote::hidden()).uzs, None);
        assert!(CurrencyProjection::new(Decimal::ZERO).is_err());
    }

    #[test]
    fn projection_overflow_drops_the_som_amount() {
        let base = Decimal::from_i128_with_scale(10_i128.pow(25), 0);
        let ladder = PriceLadder::base_only(base).unwrap();
        let quote = PriceQuote::shown(ladder.base(), PriceRule::Standard);
        let display = CurrencyProjection::default().project(&quote);
        assert_eq!(display.usd, Some(base));
        assert_eq!(display.uzs, None);

        // Fits in Decimal but not in i64.
        let quote = PriceQuote::shown(Decimal::from(10_i64.pow(16)), PriceRule::Standard);
        assert_eq!(CurrencyProjection::default().project(&quote).uzs, None);
    }

    #[test]
    fn breakdown_hides_ladder_when_quote_hidden() {
        let p = product(full_ladder(), false);
        let projection = CurrencyProjection::default();
        let hidden = PriceBreakdown::new(&p, &PriceVisibilityResolver::resolve(&p, &CallerContext::anonymous()), &projection);
        assert_eq!(hidden.base_usd, None);
        assert_eq!(hidden.wholesale_usd, None);

        let shown = PriceBreakdown::new(
            &p,
            &PriceVisibilityResolver::resolve(&p, &caller(AccountTier::Individual, None)),
            &projection,
        );
        assert_eq!(shown.base_usd, Some(d(100)));
        assert_eq!(shown.wholesale_usd, Some(d(90)));
        assert_eq!(shown.user_price.uzs, Some(1_536_000));
    }

    #[test]
    fn hidden_quote_into_visible_is_permission_denied() {
        assert!(matches!(
            PriceQuote::hidden().into_visible(),
            Err(DomainError::PermissionDenied(_))
        ));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn ladder_strategy() -> impl Strategy<Value = PriceLadder> {
            (0i64..1_000_000, proptest::option::of(0i64..1_000_000), proptest::option::of(0i64..1_000_000))
                .prop_map(|(b, r, w)| PriceLadder::new(d(b), r.map(d), w.map(d)).unwrap())
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: an unauthenticated caller sees a price iff the product allows it.
            #[test]
            fn guest_price_present_iff_visible(ladder in ladder_strategy(), guests in any::<bool>()) {
                let quote = PriceVisibilityResolver::resolve(&product(ladder, guests), &CallerContext::anonymous());
                prop_assert_eq!(quote.price.is_some(), guests);
                prop_assert_eq!(quote.visible, guests);
            }

            /// Property: a verified vip sees wholesale if present, otherwise base.
            #[test]
            fn vip_never_sees_retail(ladder in ladder_strategy()) {
                let vip = caller(AccountTier::Business, Some(PricingTier::Vip));
                let expected = ladder.wholesale().unwrap_or(ladder.base());
                let quote = PriceVisibilityResolver::resolve(&product(ladder, false), &vip);
                prop_assert_eq!(quote.price, Some(expected));
            }
        }
    }
}
