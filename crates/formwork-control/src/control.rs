//! A single control: construction, the validation pipeline and commit.

use std::sync::Arc;

use formwork_model::{
    AttributeStore, ControlAttributes, ControlOptions, ControlValue, DeferredUpdate, ERROR_CLASS,
    ElementState, ErrorOptions, ErrorReport, MemoryModel, ParentNotice, PhraseLookup, Primitive,
    PropertySchema, ValidateOptions, ValueAttribute, codes,
};
use formwork_rules::{Kind, PrepareContext, ResolvedRules, RuleContext};

use crate::config::{ControlConfig, ControlSettings};
use crate::env::{ControlEnv, ControlScope};
use crate::input::InputFilter;
use crate::render::ControlRenderer;

/// Where `update_control` takes its value from.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlInput {
    Value(ControlValue),
    /// Read the bound element, or the control's own attribute without one.
    FromElement,
}

#[derive(Debug)]
pub struct Control {
    env: ControlEnv,
    name: String,
    primitive: Primitive,
    format: Option<String>,
    controltype: String,
    schema: PropertySchema,
    controloptions: ControlOptions,
    settings: ControlSettings,
    phrasekey: String,
    rules: Arc<ResolvedRules>,
    attributes: ControlAttributes,
    report: ErrorReport,
    /// Resolved display messages; `None` when nothing is shown.
    messages: Option<Vec<String>>,
    error_flag: bool,
    element: Option<ElementState>,
    /// Last attempted value, valid or not.
    dirty: ControlValue,
    deferred: Vec<DeferredUpdate>,
}

impl Control {
    /// Resolve configuration, prepare the attributes and run the initial
    /// update against `model`.
    ///
    /// Precedence is schema, then type defaults, then instance options.
    pub fn new(env: ControlEnv, config: &ControlConfig, model: &mut MemoryModel) -> Self {
        let name = config.name.clone();
        let mut schema = model.property(&name).cloned().unwrap_or_default();
        if config.primitive.is_some() {
            schema.primitive.clone_from(&config.primitive);
        }
        if config.format.is_some() {
            schema.format.clone_from(&config.format);
        }
        let primitive = schema.primitive().unwrap_or_default();

        let fixed = config.fixed.unwrap_or(schema.fixed);
        let mut edit = config.edit.unwrap_or(!config.display);
        if fixed && model.value(&name).is_truthy() {
            edit = false;
        }
        let multiline = config.multiline.unwrap_or(schema.multiline);
        let mut settings = ControlSettings {
            edit,
            required: config.required.unwrap_or(schema.required),
            keyup: config.keyup.or(schema.keyup).unwrap_or(false),
            instant_validation: config
                .instant_validate
                .or(schema.instant_validate)
                .unwrap_or(true),
            multiline,
            value_attribute: ValueAttribute::Value,
            restrict_input: None,
        };

        let mut controltype = config
            .controltype
            .clone()
            .or_else(|| schema.controltype.clone())
            .unwrap_or_else(|| if multiline { "textarea" } else { "text" }.to_string());
        for kind in Kind::ALL {
            let type_name = match kind {
                Kind::Primitive => Some(primitive.as_str().to_string()),
                Kind::Format => schema.format.clone(),
                Kind::ControlType => Some(controltype.clone()),
            };
            let Some(type_name) = type_name else {
                continue;
            };
            if let Some(defaults) = env.registry().initialize(kind, &type_name) {
                settings.apply(defaults, config.instant_validate);
                if let Some(overridden) = &defaults.controltype
                    && config.controltype.is_none()
                {
                    controltype.clone_from(overridden);
                }
            }
        }

        let phrasekey = config
            .phrasekey
            .clone()
            .or_else(|| model.phrasekey().map(str::to_string))
            .unwrap_or_else(|| match model.name() {
                Some(model_name) => format!("model.{model_name}.{name}"),
                None => format!("model.{name}"),
            });
        let phrase = |append: &str| {
            env.phrases()
                .get(&PhraseLookup::new(&phrasekey).append(append))
        };

        let mut attributes = ControlAttributes {
            name: name.clone(),
            controlid: config
                .id
                .clone()
                .unwrap_or_else(|| format!("control-{name}")),
            label: config
                .label
                .clone()
                .or_else(|| phrase("label"))
                .unwrap_or_else(|| name.clone()),
            value: if config.value.is_absent() {
                model.value(&name)
            } else {
                config.value.clone()
            },
            placeholder: config.placeholder.clone().or_else(|| phrase("placeholder")),
            note: config.note.clone().or_else(|| phrase("note")),
            ..Default::default()
        };

        let (instance_options, passthrough) = config.split_extra();
        let mut controloptions = schema.controloptions.clone();
        controloptions.merge(&instance_options);

        let rules = Arc::new(env.registry().resolve(
            primitive,
            schema.format.as_deref(),
            &controltype,
        ));
        let mut ctx = PrepareContext {
            name: &name,
            primitive,
            edit: settings.edit,
            phrasekey: &phrasekey,
            phrases: env.phrases(),
            controloptions: &mut controloptions,
            instance: &passthrough,
            attributes: &mut attributes,
            clock: env.clock(),
        };
        for prepare in rules.prepare() {
            prepare(&mut ctx);
        }

        if let Some(max_length) = schema.max_length {
            attributes.maxlength = Some(max_length);
        }
        attributes.extra = passthrough;

        tracing::debug!(
            control = %name,
            primitive = primitive.as_str(),
            format = schema.format.as_deref().unwrap_or(""),
            %controltype,
            edit = settings.edit,
            "created control"
        );

        let mut control = Self {
            env,
            format: schema.format.clone(),
            name,
            primitive,
            controltype,
            schema,
            controloptions,
            settings,
            phrasekey,
            rules,
            attributes,
            report: ErrorReport::new(),
            messages: None,
            error_flag: false,
            element: None,
            dirty: ControlValue::Absent,
            deferred: Vec::new(),
        };
        if control.settings.edit {
            let initial = control.attributes.get(control.settings.value_attribute);
            control.update_control(
                ControlInput::Value(initial),
                &ValidateOptions::new(),
                &mut ControlScope::standalone(model),
            );
        }
        control
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn controltype(&self) -> &str {
        &self.controltype
    }

    pub fn schema(&self) -> &PropertySchema {
        &self.schema
    }

    pub fn controloptions(&self) -> &ControlOptions {
        &self.controloptions
    }

    pub fn settings(&self) -> &ControlSettings {
        &self.settings
    }

    pub fn phrasekey(&self) -> &str {
        &self.phrasekey
    }

    pub fn attributes(&self) -> &ControlAttributes {
        &self.attributes
    }

    pub fn report(&self) -> &ErrorReport {
        &self.report
    }

    pub fn has_error(&self) -> bool {
        self.report.has_error()
    }

    pub fn messages(&self) -> Option<&[String]> {
        self.messages.as_deref()
    }

    /// Whether the error indicator is currently raised.
    pub fn is_flagged(&self) -> bool {
        self.error_flag
    }

    pub fn dirty_value(&self) -> &ControlValue {
        &self.dirty
    }

    pub fn element(&self) -> Option<&ElementState> {
        self.element.as_ref()
    }

    pub fn element_mut(&mut self) -> Option<&mut ElementState> {
        self.element.as_mut()
    }

    /// Bind a fresh element mirroring the control's attributes. Rebinding
    /// replaces the previous element.
    pub fn bind_element(&mut self) -> &mut ElementState {
        let mut element = ElementState {
            value: self.attributes.value.clone(),
            checked: self.attributes.checked,
            has_cue: self.attributes.cue.is_some(),
            ..Default::default()
        };
        if let Some(max_length) = self.attributes.maxlength {
            element.set_attribute("maxlength", max_length.to_string());
        }
        if let Some(placeholder) = &self.attributes.placeholder {
            element.set_attribute("placeholder", placeholder.clone());
        }
        element.toggle_class(ERROR_CLASS, self.error_flag);
        self.element.insert(element)
    }

    /// Type into the bound element, binding one first if needed.
    pub fn set_element_value(&mut self, value: impl Into<ControlValue>) {
        let value = value.into();
        let attribute = self.settings.value_attribute;
        if self.element.is_none() {
            self.bind_element();
        }
        let Some(element) = self.element.as_mut() else {
            return;
        };
        match attribute {
            ValueAttribute::Value => element.value = value,
            ValueAttribute::Checked => element.checked = value.is_truthy(),
        }
    }

    /// Select a month/year sub-field (`month` or `year`). Returns false when
    /// the control has no such sub-field.
    pub fn set_sub_value(&mut self, part: &str, value: impl Into<String>) -> bool {
        match self.attributes.month_year.as_mut() {
            Some(state) => state.select(part, value),
            None => false,
        }
    }

    /// Current input value: the element's value (or checked state) when
    /// bound, the control's own attribute otherwise.
    pub fn get_value(&self) -> ControlValue {
        match &self.element {
            Some(element) => match self.settings.value_attribute {
                ValueAttribute::Checked => ControlValue::Bool(element.checked),
                ValueAttribute::Value => element.value.clone(),
            },
            None => self.attributes.get(self.settings.value_attribute),
        }
    }

    /// Validate, resolve display messages and, when valid, commit to the
    /// control's attributes and the shared model.
    pub fn update_control(
        &mut self,
        input: ControlInput,
        options: &ValidateOptions,
        scope: &mut ControlScope<'_>,
    ) {
        let value = match input {
            ControlInput::Value(value) => value,
            ControlInput::FromElement => self.get_value(),
        };
        let value = self.validate_control(value, options, scope);
        self.display_errors(&value);

        if self.report.has_error() {
            return;
        }
        self.attributes
            .set(self.settings.value_attribute, value.clone());
        if value != scope.model.value(&self.name) {
            let silent = self.controloptions.get_bool("silent");
            tracing::debug!(control = %self.name, %value, silent, "committed value");
            scope.model.set(&self.name, value, silent);
        }
    }

    /// Run the pipeline on `value` and return the normalized result.
    ///
    /// Display-mode controls return the value untouched.
    pub fn validate_control(
        &mut self,
        value: ControlValue,
        options: &ValidateOptions,
        scope: &mut ControlScope<'_>,
    ) -> ControlValue {
        if !self.settings.edit {
            return value;
        }
        self.report.start();

        let mut value = value.trimmed();
        let rules = Arc::clone(&self.rules);
        {
            let mut ctx = self.rule_context(options, scope);
            for normalize in rules.normalize() {
                value = normalize(value, &mut ctx);
            }
        }

        if let Some(error) = &options.error {
            self.add_error(error.clone(), options.error_options());
        } else if !self.validate_required(&value, options, scope.model) {
            let mut ctx = self.rule_context(options, scope);
            for validate in rules.validate() {
                validate(&value, &mut ctx);
            }
        }
        tracing::trace!(
            control = %self.name,
            %value,
            has_error = self.report.has_error(),
            "validated control"
        );

        if !options.rendered {
            let has_error = options.force_display.then_some(self.report.has_error());
            self.flag_error(has_error);
        }

        self.dirty = value.clone();
        if let Some(parent) = scope.parent.as_deref_mut() {
            parent.dirty.set(&self.name, value.clone(), true);
            if !value.same_as(&scope.model.value(&self.name)) {
                parent.initial_values = false;
            }
        }
        if !options.norevalidation {
            self.update_parent(options, scope);
        }
        value
    }

    /// Absence check. Returns true when the remaining validators should be
    /// skipped.
    pub fn validate_required(
        &mut self,
        value: &ControlValue,
        options: &ValidateOptions,
        model: &MemoryModel,
    ) -> bool {
        let mut absent = false;
        if self.settings.required {
            absent = match value {
                ControlValue::Absent => true,
                ControlValue::Text(text) => text.is_empty(),
                ControlValue::Bool(false) => self.primitive == Primitive::Boolean,
                ControlValue::Null => self.primitive != Primitive::Null,
                _ => false,
            };
            if absent {
                let display = model.value(&self.name).is_truthy() || options.force_display;
                self.add_error(codes::REQUIRED, ErrorOptions::with_display(display));
            }
        }
        if !value.is_truthy() && !self.settings.required {
            absent = true;
        }
        absent
    }

    pub fn add_error(&mut self, code: impl Into<String>, options: ErrorOptions) {
        let code = code.into();
        tracing::trace!(control = %self.name, %code, "validation error");
        self.report.add(code, options);
    }

    /// Keystroke-level pass: messages are cleared first and the parent is
    /// always told afterwards.
    pub fn instant_validate_control(
        &mut self,
        value: ControlValue,
        options: &ValidateOptions,
        scope: &mut ControlScope<'_>,
    ) {
        let options = ValidateOptions {
            instant_validate: true,
            ..options.clone()
        };
        self.messages = None;
        self.validate_control(value, &options, scope);
        if !self.report.has_error() && self.report.had_error() {
            self.messages = None;
        }
        self.update_parent(&ValidateOptions::new(), scope);
    }

    /// Raise or lower the error indicator.
    ///
    /// A displayed error from the previous pass keeps the indicator up while
    /// the current pass still has an error, even an undisplayed one.
    pub fn flag_error(&mut self, has_error: Option<bool>) {
        let has_error = has_error.unwrap_or(false) || self.report.flagged();
        if !has_error
            && self.report.has_error()
            && self.report.had_error()
            && self.report.has_display_errors()
        {
            return;
        }
        self.error_flag = has_error;
        if let Some(element) = self.element.as_mut() {
            element.toggle_class(ERROR_CLASS, has_error);
        }
    }

    /// Tell the parent form about this control's state: errors disable it
    /// at once, success asks for a re-validation of every control.
    pub fn update_parent(&mut self, options: &ValidateOptions, scope: &mut ControlScope<'_>) {
        let Some(parent) = scope.parent.as_deref_mut() else {
            return;
        };
        if self.report.has_error() {
            parent.disable_form();
        } else if !options.norevalidation {
            parent.post(ParentNotice::Revalidate);
        }
    }

    /// Resolve the displayed codes into messages, or clear them.
    pub fn display_errors(&mut self, value: &ControlValue) {
        if !self.report.has_display_errors() {
            self.messages = None;
            return;
        }
        let value = value.render();
        let phrases = self.env.phrases();
        let messages = self
            .report
            .display_codes()
            .iter()
            .map(|code| {
                let params = |lookup: PhraseLookup| {
                    lookup
                        .param("name", self.name.as_str())
                        .param("label", self.attributes.label.as_str())
                        .param("value", value.as_str())
                };
                phrases
                    .get(&params(
                        PhraseLookup::new(&self.phrasekey)
                            .append("error")
                            .appendix(code.as_str()),
                    ))
                    .or_else(|| {
                        phrases.get(&params(
                            PhraseLookup::new("control.error").appendix(code.as_str()),
                        ))
                    })
                    .unwrap_or_else(|| code.clone())
            })
            .collect();
        self.messages = Some(messages);
    }

    /// Resize a security-code control to `length` digits.
    pub fn set_security_code_length(&mut self, length: usize) {
        self.schema.exact_length = Some(length);
        if self.attributes.maxlength == Some(length) {
            return;
        }
        let placeholder = "•".repeat(length);
        self.attributes.maxlength = Some(length);
        self.attributes.placeholder = Some(placeholder.clone());
        if let Some(element) = self.element.as_mut() {
            element.set_attribute("maxlength", length.to_string());
            element.set_attribute("placeholder", placeholder);
        }
    }

    /// Whether a keydown should reach the input.
    pub fn accepts_keydown(&self, alt: bool) -> bool {
        self.input_filter()
            .is_none_or(|filter| filter.accepts_keydown(alt))
    }

    /// Whether a typed character should reach the input.
    pub fn accepts_keypress(&self, key: char) -> bool {
        let current = self.get_value().render();
        self.input_filter()
            .is_none_or(|filter| filter.accepts_char(key, &current))
    }

    fn input_filter(&self) -> Option<InputFilter> {
        let family = self
            .settings
            .restrict_input
            .as_deref()
            .unwrap_or(self.primitive.as_str());
        InputFilter::parse(family)
    }

    pub fn take_deferred(&mut self) -> Vec<DeferredUpdate> {
        std::mem::take(&mut self.deferred)
    }

    /// Apply queued updates to the bound element. Without an element they
    /// are dropped.
    pub fn run_deferred(&mut self) {
        for update in self.take_deferred() {
            let Some(element) = self.element.as_mut() else {
                continue;
            };
            match update {
                DeferredUpdate::SetElementValue(text) => element.value = ControlValue::Text(text),
            }
        }
    }

    /// Template name: `{controltype}.{mode}`, or the generic text template
    /// when the renderer has none for this controltype.
    pub fn template(&self, renderer: &dyn ControlRenderer) -> String {
        let mode = if self.settings.edit { "edit" } else { "display" };
        let template = format!("{}.{mode}", self.controltype);
        if renderer.has_template(&template) {
            template
        } else {
            format!("text.{mode}")
        }
    }

    /// Attribute bag handed to the template. Wrapper-only attributes (label,
    /// placeholder) are kept off the input's own `attributes`.
    pub fn context(&self, renderer: &dyn ControlRenderer) -> serde_json::Value {
        use serde_json::Value;

        let mut context = match serde_json::to_value(&self.attributes) {
            Ok(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        if let Some(Value::Object(extra)) = context.remove("extra") {
            for (key, value) in extra {
                context.entry(key).or_insert(value);
            }
        }

        let mut input = context.clone();
        input.remove("controlid");
        input.remove("label");
        input.insert("id".to_string(), Value::String(self.attributes.controlid.clone()));
        context.remove("placeholder");
        context.insert("attributes".to_string(), Value::Object(input));
        context.insert(
            "controltype".to_string(),
            Value::String(self.controltype.clone()),
        );
        context.insert(
            "controltemplate".to_string(),
            Value::String(self.template(renderer)),
        );
        context.insert(
            "error".to_string(),
            serde_json::json!(self.messages.as_deref().unwrap_or_default()),
        );
        Value::Object(context)
    }

    pub fn render(&self, renderer: &dyn ControlRenderer) -> String {
        renderer.render(&self.template(renderer), &self.context(renderer))
    }

    fn rule_context<'a>(
        &'a mut self,
        options: &'a ValidateOptions,
        scope: &'a mut ControlScope<'_>,
    ) -> RuleContext<'a> {
        RuleContext {
            name: &self.name,
            primitive: self.primitive,
            schema: &self.schema,
            controloptions: &self.controloptions,
            attributes: &self.attributes,
            value_attribute: self.settings.value_attribute,
            options,
            report: &mut self.report,
            element: self.element.as_mut(),
            model: &mut *scope.model,
            parent: scope.parent.as_deref_mut(),
            deferred: &mut self.deferred,
            clock: self.env.clock(),
        }
    }
}
