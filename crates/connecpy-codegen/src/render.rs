//! Python stub rendering.
//!
//! The renderer only reads the resolved [`FileModel`]; every module alias and
//! symbol it prints was already decided by the model builder.

use std::fmt::Write as _;

use crate::error::RenderError;
use crate::model::{FileModel, MethodModel, ServiceModel};
use crate::symbols::Symbol;

/// Hard keywords of Python 3. Soft keywords (`match`, `case`, `type`) remain
/// usable as names.
const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

pub trait Renderer {
    fn render(&self, model: &FileModel) -> Result<String, RenderError>;
}

/// Emits connecpy client/server stubs (async and sync flavours).
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonRenderer;

impl Renderer for PythonRenderer {
    fn render(&self, model: &FileModel) -> Result<String, RenderError> {
        for service in &model.services {
            check_identifier("service", &service.name)?;
            for method in &service.methods {
                check_identifier("method", &method.name)?;
                // connecpy stubs are unary only.
                if method.is_streaming() {
                    return Err(RenderError::UnsupportedStreaming {
                        service: service.name.clone(),
                        method: method.name.clone(),
                    });
                }
            }
        }
        for symbol in model.symbols() {
            check_symbol(symbol)?;
        }

        let mut out = String::new();
        write_header(&mut out, model)?;
        for service in &model.services {
            write_service(&mut out, service)?;
        }
        Ok(out)
    }
}

fn check_identifier(kind: &'static str, name: &str) -> Result<(), RenderError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid && !PYTHON_KEYWORDS.contains(&name) {
        Ok(())
    } else {
        Err(RenderError::InvalidIdentifier {
            kind,
            name: name.to_string(),
        })
    }
}

/// Every dotted part of a symbol ends up in an annotation or import line.
fn check_symbol(symbol: &Symbol) -> Result<(), RenderError> {
    // Python cannot import a message declared outside any package.
    if symbol.module.module.is_empty() {
        return Err(RenderError::UnimportableSymbol {
            symbol: symbol.to_string(),
        });
    }
    for part in symbol.module.module.split('.') {
        check_identifier("module", part)?;
    }
    for part in symbol.name.split('.') {
        check_identifier("message", part)?;
    }
    Ok(())
}

fn write_header(out: &mut String, model: &FileModel) -> Result<(), RenderError> {
    writeln!(out, "# -*- coding: utf-8 -*-")?;
    writeln!(out, "# Generated by protoc-gen-connecpy.  DO NOT EDIT!")?;
    writeln!(out, "# source: {}", model.file_name)?;
    writeln!(out)?;
    writeln!(out, "from typing import Iterable, Optional, Protocol")?;
    writeln!(out)?;
    writeln!(out, "import httpx")?;
    writeln!(out)?;
    writeln!(out, "from connecpy._server_async import ConnecpyASGIApplication")?;
    writeln!(
        out,
        "from connecpy._server_shared import Endpoint, ServerInterceptor, ServiceContext"
    )?;
    writeln!(out, "from connecpy._server_sync import ConnecpyWSGIApplication")?;
    writeln!(
        out,
        "from connecpy.client import ConnecpyClient, ConnecpyClientSync, RequestHeaders"
    )?;
    writeln!(out, "from connecpy.code import Code")?;
    writeln!(out, "from connecpy.exceptions import ConnecpyException")?;
    if !model.imports.is_empty() {
        writeln!(out)?;
        for import in &model.imports {
            writeln!(out, "import {} as {}", import.module, import.alias)?;
        }
    }
    Ok(())
}

fn write_service(out: &mut String, service: &ServiceModel) -> Result<(), RenderError> {
    let full_name = service.full_name();
    for sync in [false, true] {
        write_protocol(out, service, sync)?;
        write_application(out, service, &full_name, sync)?;
        write_client(out, service, &full_name, sync)?;
    }
    Ok(())
}

fn write_protocol(out: &mut String, service: &ServiceModel, sync: bool) -> Result<(), RenderError> {
    let (suffix, def) = if sync { ("Sync", "def") } else { ("", "async def") };
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "class {}{}(Protocol):", service.name, suffix)?;
    if service.methods.is_empty() {
        writeln!(out, "    pass")?;
    }
    for (i, method) in service.methods.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(
            out,
            "    {def} {}(self, req: {}, ctx: ServiceContext) -> {}:",
            method.name, method.input, method.output
        )?;
        writeln!(
            out,
            "        raise ConnecpyException(Code.UNIMPLEMENTED, \"Not implemented\")"
        )?;
    }
    Ok(())
}

fn write_application(
    out: &mut String,
    service: &ServiceModel,
    full_name: &str,
    sync: bool,
) -> Result<(), RenderError> {
    let (protocol, base, kind) = if sync {
        (format!("{}Sync", service.name), "ConnecpyWSGIApplication", "WSGI")
    } else {
        (service.name.clone(), "ConnecpyASGIApplication", "ASGI")
    };
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "class {}{}Application({}):", service.name, kind, base)?;
    if sync {
        writeln!(out, "    def __init__(self, service: {protocol}):")?;
    } else {
        writeln!(
            out,
            "    def __init__(self, service: {protocol}, *, interceptors: Iterable[ServerInterceptor] = ()):"
        )?;
    }
    writeln!(out, "        super().__init__(")?;
    writeln!(out, "            path=\"/{full_name}\",")?;
    writeln!(out, "            endpoints={{")?;
    for method in &service.methods {
        write_endpoint(out, service, full_name, method)?;
    }
    writeln!(out, "            }},")?;
    if !sync {
        writeln!(out, "            interceptors=interceptors,")?;
    }
    writeln!(out, "        )")?;
    writeln!(out)?;
    writeln!(out, "    @property")?;
    writeln!(out, "    def service_name(self):")?;
    writeln!(out, "        return \"{full_name}\"")?;
    Ok(())
}

fn write_endpoint(
    out: &mut String,
    service: &ServiceModel,
    full_name: &str,
    method: &MethodModel,
) -> Result<(), RenderError> {
    writeln!(
        out,
        "                \"/{full_name}/{}\": Endpoint[{}, {}](",
        method.name, method.input, method.output
    )?;
    writeln!(out, "                    service_name=\"{}\",", service.name)?;
    writeln!(out, "                    name=\"{}\",", method.name)?;
    writeln!(out, "                    function=service.{},", method.name)?;
    writeln!(out, "                    input={},", method.input)?;
    writeln!(out, "                    output={},", method.output)?;
    writeln!(
        out,
        "                    allowed_methods={},",
        allowed_methods(method)
    )?;
    writeln!(out, "                ),")?;
    Ok(())
}

fn allowed_methods(method: &MethodModel) -> &'static str {
    if method.no_side_effects {
        "(\"GET\", \"POST\")"
    } else {
        "(\"POST\",)"
    }
}

fn write_client(
    out: &mut String,
    service: &ServiceModel,
    full_name: &str,
    sync: bool,
) -> Result<(), RenderError> {
    let (class, base, def, call, session) = if sync {
        ("ClientSync", "ConnecpyClientSync", "def", "return self._make_request(", "httpx.Client")
    } else {
        (
            "Client",
            "ConnecpyClient",
            "async def",
            "return await self._make_request(",
            "httpx.AsyncClient",
        )
    };
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "class {}{}({}):", service.name, class, base)?;
    if service.methods.is_empty() {
        writeln!(out, "    pass")?;
    }
    for (i, method) in service.methods.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "    {def} {}(", method.name)?;
        writeln!(out, "        self,")?;
        writeln!(out, "        *,")?;
        writeln!(out, "        request: {},", method.input)?;
        writeln!(out, "        headers: Optional[RequestHeaders] = None,")?;
        writeln!(out, "        timeout_ms: Optional[int] = None,")?;
        writeln!(out, "        server_path_prefix: str = \"\",")?;
        writeln!(out, "        session: Optional[{session}] = None,")?;
        if method.no_side_effects {
            writeln!(out, "        use_get: bool = False,")?;
        }
        writeln!(out, "        **kwargs,")?;
        writeln!(out, "    ) -> {}:", method.output)?;
        if method.no_side_effects {
            writeln!(out, "        method = \"GET\" if use_get else \"POST\"")?;
        } else {
            writeln!(out, "        method = \"POST\"")?;
        }
        writeln!(out, "        {call}")?;
        writeln!(
            out,
            "            url=f\"{{server_path_prefix}}/{full_name}/{}\",",
            method.name
        )?;
        writeln!(out, "            headers=headers,")?;
        writeln!(out, "            timeout_ms=timeout_ms,")?;
        writeln!(out, "            request=request,")?;
        writeln!(out, "            response_class={},", method.output)?;
        writeln!(out, "            method=method,")?;
        writeln!(out, "            session=session,")?;
        writeln!(out, "            **kwargs,")?;
        writeln!(out, "        )")?;
    }
    Ok(())
}
