//! Generation pipeline.
//!
//! A [`Generator`] holds the inputs of a run: configuration, type catalog,
//! root types, controllers and transforms. [`Generator::generate`] builds
//! all per-run state (registry, namer, wrapper set) from scratch, so calling
//! it twice yields identical output.

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::TypeCatalog;
use crate::codegen::{TypeNamer, codegen_definitions, codegen_enums, codegen_services};
use crate::compiler::{CompiledController, RouteCompiler};
use crate::config::GeneratorConfig;
use crate::error::{Diagnostic, Result};
use crate::hubs::HubCompiler;
use crate::model::{ApiDescription, BackendType, ControllerDesc, HubDesc};
use crate::native::NativeTable;
use crate::resources;
use crate::transform::{TransformRegistry, TypeTransform};
use crate::walker::{TypeKind, TypeRegistry, TypeWalker};
use crate::wrappers::WrapperSet;

#[derive(Debug)]
pub struct Generator {
    config: GeneratorConfig,
    natives: NativeTable,
    catalog: TypeCatalog,
    transforms: TransformRegistry,
    roots: Vec<String>,
    controllers: Vec<ControllerDesc>,
    hubs: Vec<HubDesc>,
}

/// Rendered files plus what was learned while producing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedOutput {
    pub definitions: String,
    pub enums: String,
    pub services: String,
    pub diagnostics: Vec<Diagnostic>,
    pub routes: Vec<RouteSummary>,
    pub types: Vec<TypeSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSummary {
    pub controller: String,
    pub action: String,
    pub method_name: String,
    pub http_method: String,
    pub template: String,
    pub body: Option<String>,
    pub query: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeSummary {
    pub name: String,
    pub kind: &'static str,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let transforms = TransformRegistry::from_config(&config)?;
        Ok(Self {
            config,
            natives: NativeTable::default(),
            catalog: TypeCatalog::new(),
            transforms,
            roots: Vec::new(),
            controllers: Vec::new(),
            hubs: Vec::new(),
        })
    }

    pub fn from_description(config: GeneratorConfig, description: ApiDescription) -> Result<Self> {
        let mut generator = Self::new(config)?;
        for ty in description.types {
            generator.add_type(ty)?;
        }
        for root in description.roots {
            generator.add_root(root);
        }
        for controller in description.controllers {
            generator.add_controller(controller);
        }
        for hub in description.hubs {
            generator.add_hub(hub);
        }
        Ok(generator)
    }

    /// Register an additional transform after the configured ones.
    #[must_use]
    pub fn with_transform(mut self, transform: Box<dyn TypeTransform>) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn add_type(&mut self, ty: BackendType) -> Result<&mut Self> {
        self.catalog.insert(ty)?;
        Ok(self)
    }

    /// Generate this type even if no action references it.
    pub fn add_root(&mut self, expr: impl Into<String>) -> &mut Self {
        self.roots.push(expr.into());
        self
    }

    pub fn add_controller(&mut self, controller: ControllerDesc) -> &mut Self {
        self.controllers.push(controller);
        self
    }

    /// Emit SignalR proxies for this hub into the services file.
    pub fn add_hub(&mut self, hub: HubDesc) -> &mut Self {
        self.hubs.push(hub);
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn generate(&self) -> Result<GeneratedOutput> {
        info!(
            types = self.catalog.len(),
            roots = self.roots.len(),
            controllers = self.controllers.len(),
            hubs = self.hubs.len(),
            "Generating client."
        );
        let registry = self.walk()?;
        let namer = TypeNamer::new(&registry, &self.transforms, self.config.render.type_namespace.clone())?;
        let mut wrappers = WrapperSet::analyze(&registry, &self.transforms)?;

        let compiled = {
            let mut compiler = RouteCompiler::new(&registry, &namer, &mut wrappers, &self.config.methods.naming);
            self.controllers
                .iter()
                .map(|controller| compiler.compile_controller(controller))
                .collect::<Result<Vec<_>>>()?
        };
        let hubs = HubCompiler::new(&registry, &namer, &mut wrappers).compile(&self.hubs)?;
        debug!(wrappers = wrappers.names().count(), "Routes compiled.");

        let indent = &self.config.render.indent;
        let definitions = codegen_definitions(&registry, &namer)?.render(indent);
        let enums = codegen_enums(&registry, &namer, &self.config.enums).render(indent);
        let services = codegen_services(&compiled, &hubs, &wrappers, &self.config.render)?.render(indent);

        Ok(GeneratedOutput {
            definitions: self.decorate(&definitions)?,
            enums: self.decorate(&enums)?,
            services: self.decorate(&services)?,
            diagnostics: registry.diagnostics().to_vec(),
            routes: summarize_routes(&compiled),
            types: summarize_types(&registry),
        })
    }

    fn walk(&self) -> Result<TypeRegistry> {
        let mut walker = TypeWalker::new(&self.catalog, &self.natives, &self.config.types);
        for root in &self.roots {
            walker.resolve(root)?;
        }
        for controller in &self.controllers {
            for action in &controller.actions {
                if let Some(returns) = &action.returns {
                    walker.resolve(returns)?;
                }
                for param in &action.parameters {
                    walker.resolve(&param.ty)?;
                }
            }
        }
        for hub in &self.hubs {
            for expr in hub.type_exprs() {
                walker.resolve(expr)?;
            }
        }
        Ok(walker.finish())
    }

    /// Wrap a rendered module with the banner, header and footer.
    fn decorate(&self, body: &str) -> Result<String> {
        let render = &self.config.render;
        let mut out = String::new();
        if render.banner {
            out.push_str(&resources::load(resources::GENERATED_NOTICE)?);
            out.push('\n');
        }
        if let Some(header) = &render.header {
            out.push_str(header.trim_end());
            out.push_str("\n\n");
        }
        out.push_str(body);
        if let Some(footer) = &render.footer {
            out.push('\n');
            out.push_str(footer.trim_end());
            out.push('\n');
        }
        Ok(out)
    }
}

fn summarize_routes(controllers: &[CompiledController]) -> Vec<RouteSummary> {
    controllers
        .iter()
        .flat_map(|controller| {
            controller.actions.iter().map(move |action| RouteSummary {
                controller: controller.name.clone(),
                action: action.action.clone(),
                method_name: action.method_name.clone(),
                http_method: action.http_method.as_str().to_string(),
                template: action.template.clone(),
                body: action.body_param().map(|p| p.name.clone()),
                query: action.url.query.iter().map(|q| q.name.clone()).collect(),
            })
        })
        .collect()
}

fn summarize_types(registry: &TypeRegistry) -> Vec<TypeSummary> {
    registry
        .iter()
        .map(|(_, node)| TypeSummary {
            name: node.key.clone(),
            kind: match &node.kind {
                TypeKind::Collection { .. } => "collection",
                TypeKind::Dictionary { .. } => "dictionary",
                TypeKind::Enum(_) => "enum",
                TypeKind::Class(class) if class.is_declaration() => "class",
                TypeKind::Class(_) => "instantiation",
            },
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::{ActionDesc, HttpMethod, ParamDesc};

    fn generator(config: GeneratorConfig) -> Generator {
        let mut generator = Generator::new(config).unwrap();
        generator
            .add_type(BackendType::class("MyApp.Note").member("text", "string"))
            .unwrap()
            .add_controller(
                ControllerDesc::new("NotesController").action(
                    ActionDesc::new("Get", HttpMethod::Get, "{id}")
                        .param(ParamDesc::new("id", "int"))
                        .returns("MyApp.Note"),
                ),
            );
        generator
    }

    #[test]
    fn test_banner_header_footer() {
        let mut config = GeneratorConfig::default();
        config.render.header = Some("/* eslint-disable */".into());
        config.render.footer = Some("// end".into());
        let out = generator(config).generate().unwrap();
        assert!(out.services.starts_with("// <auto-generated>"));
        assert!(out.services.contains("// </auto-generated>\n\n/* eslint-disable */\n\nimport { Ajax"));
        assert!(out.services.ends_with("\n// end\n"));
    }

    #[test]
    fn test_banner_can_be_disabled() {
        let mut config = GeneratorConfig::default();
        config.render.banner = false;
        let out = generator(config).generate().unwrap();
        assert!(out.definitions.starts_with("declare namespace MyApp {"));
    }

    #[test]
    fn test_summaries() {
        let out = generator(GeneratorConfig::default()).generate().unwrap();
        assert_eq!(out.routes.len(), 1);
        assert_eq!(out.routes[0].template, "api/Notes/{id}");
        assert_eq!(out.routes[0].http_method, "GET");
        assert_eq!(out.routes[0].method_name, "get");
        assert_eq!(
            out.types,
            vec![TypeSummary {
                name: "MyApp.Note".into(),
                kind: "class"
            }]
        );
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_with_transform_registers_after_config() {
        let mut generator = Generator::new(GeneratorConfig::default())
            .unwrap()
            .with_transform(Box::new(crate::transform::MomentTimeSpan));
        generator
            .add_type(BackendType::class("MyApp.Slot").member("start", "System.TimeSpan"))
            .unwrap()
            .add_root("MyApp.Slot");
        let out = generator.generate().unwrap();
        assert!(out.definitions.contains("start: moment.Moment;"));
    }

    #[test]
    fn test_route_roles_are_summarized() {
        let mut generator = Generator::new(GeneratorConfig::default()).unwrap();
        generator
            .add_type(BackendType::class("MyApp.Note").member("text", "string"))
            .unwrap()
            .add_controller(
                ControllerDesc::new("NotesController").action(
                    ActionDesc::new("Update", HttpMethod::Put, "{id}")
                        .param(ParamDesc::new("id", "int"))
                        .param(ParamDesc::new("note", "MyApp.Note"))
                        .param(ParamDesc::new("force", "bool").optional()),
                ),
            );
        let out = generator.generate().unwrap();
        assert_eq!(out.routes[0].body.as_deref(), Some("note"));
        assert_eq!(out.routes[0].query, vec!["force"]);
    }
}
