//! `payment-card` format: card type detection by issuer prefix, acceptance,
//! length and Luhn checks.

use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};

use formwork_model::{
    AttributeStore, ClientDefaults, ControlValue, ParentNotice, TypeDefaults, codes,
};
use regex::Regex;

use crate::context::RuleContext;
use crate::registry::{Kind, RuleRegistry, TypeRules};

/// Element class prefix reflecting the detected card type.
pub const CARD_TYPE_CLASS_PREFIX: &str = "card-type-";
/// Sibling control holding the card security code.
pub const SECURITY_CODE_CONTROL: &str = "ccv";
pub const DEFAULT_SECURITY_CODE_LENGTH: usize = 3;
/// Model attributes only meaningful for cards with additional fields.
pub const ADDITIONAL_FIELDS: &[&str] = &["issuenumber", "startdate"];

/// One entry of the issuer table.
#[derive(Debug)]
pub struct CardType {
    pub name: &'static str,
    pattern: Regex,
    pub lengths: &'static [usize],
    pub security_code: usize,
    /// Issue number and start date are collected for this type.
    pub additional_fields: bool,
    pub debit: bool,
}

impl CardType {
    fn new(name: &'static str, pattern: &str, lengths: &'static [usize]) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("Invalid card type regex"),
            lengths,
            security_code: DEFAULT_SECURITY_CODE_LENGTH,
            additional_fields: false,
            debit: false,
        }
    }

    fn security_code(mut self, length: usize) -> Self {
        self.security_code = length;
        self
    }

    fn debit(mut self) -> Self {
        self.debit = true;
        self
    }

    fn additional_fields(mut self) -> Self {
        self.additional_fields = true;
        self
    }

    /// Length of the matched prefix, if the number starts with this type's
    /// issuer range.
    fn prefix_len(&self, number: &str) -> Option<usize> {
        self.pattern.find(number).map(|m| m.len())
    }

    pub fn accepts_length(&self, length: usize) -> bool {
        self.lengths.contains(&length)
    }
}

const VISA_DEBIT_PATTERN: &str = concat!(
    r"^4(01106|01180|013|01795|02802|029|035|03675|03677|03897|04137|04645|05625|05670|05919|060|",
    r"06632|07441|09908|10773|11636|117|124|1298[45]|14051|14588|15231|15461|15981|16724|18238|",
    r"18370|19672|20719|20767|20792|20841|20984|213|21473|21494|216|2176[456]|22127|238|23953|",
    r"23966|251|2543[56]|256|25914|26579|27342|27557|28208|28332|28418|28454|29475|29531|29805|",
    r"29812|30552|30605|30763|312|3193[012]|31935|31940|31947|3262[456789]|32630|32732|32901|",
    r"32937|329386|329387|32995|33991|34256|34257|34258|35225|356|35760|36618|36742|37737|382|",
    r"41104|42729|42730|42742|42790|430|435|43420|43438|43469|451|45785|46053|46106|46157|46261|",
    r"46268|46272|46274|46277|46278|46279|46291|470|47452|479|48027|48156|48360|490|492|49533|",
    r"506|507|50875|51368|536|53978|53979|54202|543|54434|54742|549|551|55451|557|560|56351|",
    r"56403|56406|56413|56414|56432|56445|56475|56726|56735|56738|568|569|58109|58440|585|",
    r"60005|62239|62263|62288|64944|65345|65858|65859|65861|65901|65904|65921|65942|65943|",
    r"65944|65946|68805|69568|70132|70758|72409|73099|73354|736|744|74480|75034|75055|75110|",
    r"75114|75116|75117|75118|75126|75127|75128|75129|75130|75131|75132|75423|75637|75714|",
    r"75747|760|76[1234]|76225|76559|77462|77548|77596|779|78200|78880|79056|79213|79293|",
    r"79348|797|79884|800|80119|80686|815|828|82840|83512|83531|83564|83741|841|84823|85342|",
    r"854|85751|86290|88839|892|90077|90292|903|905|909|911|91859|921|92181|92182|92183|",
    r"92184|925|929|93414|936|94120|95055|97766|98022|98864|98857|99811)",
);

/// Issuer table in match-priority order: on equal prefix lengths the
/// earlier entry wins.
pub static CARD_TYPES: LazyLock<Vec<CardType>> = LazyLock::new(|| {
    vec![
        CardType::new("amex", r"^3[47]", &[15]).security_code(4),
        CardType::new("dinersclubcarteblanche", r"^30[0-5]", &[14]),
        CardType::new("dinersclubinternational", r"^36", &[14]),
        CardType::new("jcb", r"^35(2[89]|[3-8][0-9])", &[16]),
        CardType::new("laser", r"^(6304|670[69]|6771)", &[16, 17, 18, 19]).debit(),
        CardType::new(
            "visaprepaid",
            r"^(405851|405856|410489|418122|420792|475743|476072|497766)",
            &[16],
        )
        .debit(),
        CardType::new(
            "visaelectron",
            r"^(4026|417500|4405|4508|4844|491(3|7)|491880)",
            &[16],
        )
        .debit(),
        CardType::new("visadebit", VISA_DEBIT_PATTERN, &[16, 19]).debit(),
        CardType::new("visa", r"^4\d{3}", &[13, 16]),
        CardType::new("mastercard", r"^5[1-5]", &[16]),
        CardType::new(
            "maestro",
            r"^(5018|5020|5038|5612|5893|6304|6759|676[1-3]|0604|6390)",
            &[12, 13, 14, 15, 16, 17, 18, 19],
        )
        .debit()
        .additional_fields(),
        CardType::new(
            "discover",
            r"^(6011|622(12[6-9]|1[3-9][0-9]|[2-8][0-9]{2}|9[0-1][0-9]|92[0-5]|64[4-9])|65)",
            &[16],
        ),
    ]
});

/// Detect the card type by the longest matching issuer prefix.
pub fn card_type(number: &str) -> Option<&'static CardType> {
    let mut matched: Option<(&'static CardType, usize)> = None;
    for card in CARD_TYPES.iter() {
        if let Some(len) = card.prefix_len(number)
            && matched.is_none_or(|(_, best)| len > best)
        {
            matched = Some((card, len));
        }
    }
    matched.map(|(card, _)| card)
}

/// Standard mod-10 checksum, doubling every second digit from the right.
pub fn luhn_valid(number: &str) -> bool {
    let mut sum = 0u32;
    for (index, c) in number.chars().rev().enumerate() {
        let Some(mut digit) = c.to_digit(10) else {
            return false;
        };
        if index % 2 == 1 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }
    sum % 10 == 0
}

/// Card types a form accepts. An empty configured list accepts every type.
#[derive(Debug, Clone)]
pub struct AcceptedCards {
    names: BTreeSet<String>,
}

impl AcceptedCards {
    pub fn from_defaults(defaults: &ClientDefaults) -> Self {
        let names = if defaults.card_types.is_empty() {
            CARD_TYPES.iter().map(|card| card.name.to_string()).collect()
        } else {
            defaults.card_types.iter().cloned().collect()
        };
        Self { names }
    }

    pub fn accepts(&self, card: &CardType) -> bool {
        self.names.contains(card.name)
    }
}

pub fn register(registry: &mut RuleRegistry, defaults: &ClientDefaults) {
    let accepted = Arc::new(AcceptedCards::from_defaults(defaults));
    registry.register_type(
        Kind::Format,
        "payment-card",
        TypeRules::new()
            .initialize(
                TypeDefaults::default()
                    .instant_validation(true)
                    .restrict_input("payment-card"),
            )
            .normalize(normalize_card)
            .validate(move |value, ctx| validate_card(value, ctx, &accepted)),
    );
}

fn normalize_card(value: ControlValue, ctx: &mut RuleContext<'_>) -> ControlValue {
    let value = if value.is_truthy() {
        ControlValue::Text(value.render().replace([' ', '-'], ""))
    } else {
        value
    };
    if !value.is_truthy() {
        show_card_type(ctx, None);
    }
    value
}

fn validate_card(value: &ControlValue, ctx: &mut RuleContext<'_>, accepted: &AcceptedCards) {
    let options = ctx.instant_error_options();
    let number = value.render();

    let Some(card) = card_type(&number) else {
        ctx.add_error(codes::CARD_UNDEFINED_TYPE, options);
        show_card_type(ctx, None);
        show_additional_fields(ctx, false);
        return;
    };
    show_card_type(ctx, Some(card));

    if !accepted.accepts(card) {
        ctx.add_error(codes::CARD_INVALID_TYPE, options);
        show_additional_fields(ctx, false);
        return;
    }
    show_additional_fields(ctx, card.additional_fields);

    if !card.accepts_length(number.chars().count()) {
        ctx.add_error(codes::CARD_INVALID_LENGTH, options);
        return;
    }
    if !luhn_valid(&number) {
        ctx.add_error(codes::CARD_INVALID_LUHN, options);
        return;
    }
    tracing::debug!(control = ctx.name, card = card.name, "card accepted");
    ctx.model
        .set("cardtype", ControlValue::text(card.name), false);
}

/// Reflect the detected type on the element and resize the sibling
/// security-code control.
fn show_card_type(ctx: &mut RuleContext<'_>, card: Option<&CardType>) {
    if let Some(element) = ctx.element_mut() {
        match card {
            Some(card) => {
                let class = format!("{CARD_TYPE_CLASS_PREFIX}{}", card.name);
                if !element.has_class(&class) {
                    element.remove_prefixed_class(CARD_TYPE_CLASS_PREFIX);
                    element.toggle_class(&class, true);
                }
            }
            None => element.remove_prefixed_class(CARD_TYPE_CLASS_PREFIX),
        }
    }
    let length = card.map_or(DEFAULT_SECURITY_CODE_LENGTH, |card| card.security_code);
    ctx.post(ParentNotice::SecurityCode {
        target: SECURITY_CODE_CONTROL.to_string(),
        length,
    });
}

fn show_additional_fields(ctx: &mut RuleContext<'_>, on: bool) {
    let Some(parent) = ctx.parent_mut() else {
        return;
    };
    parent.show_additional = on;
    if !on {
        for field in ADDITIONAL_FIELDS {
            ctx.model.unset(field, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(number: &str) -> Option<&'static str> {
        card_type(number).map(|card| card.name)
    }

    #[test]
    fn longest_prefix_wins() {
        assert_eq!(detect("4026000000000002"), Some("visaelectron"));
        assert_eq!(detect("4111111111111111"), Some("visa"));
        assert_eq!(detect("4058510000000000"), Some("visaprepaid"));
        assert_eq!(detect("4029800000000000"), Some("visadebit"));
    }

    #[test]
    fn equal_prefixes_prefer_earlier_entry() {
        // 6304 is claimed by both laser and maestro.
        assert_eq!(detect("6304000000000000"), Some("laser"));
    }

    #[test]
    fn detects_other_issuers() {
        assert_eq!(detect("378282246310005"), Some("amex"));
        assert_eq!(detect("5555555555554444"), Some("mastercard"));
        assert_eq!(detect("6011111111111117"), Some("discover"));
        assert_eq!(detect("5018000000000009"), Some("maestro"));
        assert_eq!(detect("9999"), None);
        assert_eq!(detect(""), None);
    }

    #[test]
    fn luhn_known_numbers() {
        assert!(luhn_valid("4111111111111111"));
        assert!(luhn_valid("378282246310005"));
        assert!(!luhn_valid("4111111111111112"));
        assert!(!luhn_valid("41111x1111111111"));
    }

    #[test]
    fn accepted_cards_default_to_visa_and_mastercard() {
        let accepted = AcceptedCards::from_defaults(&ClientDefaults::default());
        assert!(accepted.accepts(card_type("4111111111111111").expect("visa")));
        assert!(!accepted.accepts(card_type("378282246310005").expect("amex")));

        let everything = AcceptedCards::from_defaults(&ClientDefaults {
            card_types: Vec::new(),
        });
        assert!(everything.accepts(card_type("378282246310005").expect("amex")));
    }
}
