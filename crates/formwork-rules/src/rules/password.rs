//! Password group: old, new and confirmation fields sharing the
//! `password-new` controltype and told apart by control name.

use formwork_model::{AttributeStore, ControlValue, ErrorOptions, ParentNotice, codes};

use crate::context::RuleContext;
use crate::registry::{Kind, RuleRegistry, TypeRules};

pub const OLD_PASSWORD: &str = "password-old";
pub const NEW_PASSWORD: &str = "password-new";
pub const CONFIRM_PASSWORD: &str = "password-confirm";

pub fn register(registry: &mut RuleRegistry) {
    registry.register_type(
        Kind::ControlType,
        "password-new",
        TypeRules::new().validate(validate_password),
    );
}

fn validate_password(value: &ControlValue, ctx: &mut RuleContext<'_>) {
    if !ctx.has_parent() || ctx.options.norevalidation {
        return;
    }

    match ctx.name {
        OLD_PASSWORD => {
            if !value.is_truthy() {
                ctx.add_error(codes::PASSWORD_OLD_REQUIRED, ErrorOptions::default());
            }
        }
        NEW_PASSWORD => {
            ctx.post(ParentNotice::InstantValidate {
                target: CONFIRM_PASSWORD.to_string(),
                prompted: true,
            });
        }
        _ => {
            let confirm = value.render();
            let confirm = confirm.trim();
            let password = ctx
                .parent
                .as_deref()
                .map(|parent| parent.dirty.value(NEW_PASSWORD).render())
                .unwrap_or_default();
            let password = password.trim();

            if !password.is_empty() && confirm.is_empty() {
                ctx.add_error(codes::PASSWORD_NO_CONFIRMATION, ErrorOptions::with_display(true));
            } else if !confirm.is_empty() && password != confirm {
                ctx.add_error(codes::PASSWORD_MISMATCH, ErrorOptions::default());
            }
        }
    }
}
