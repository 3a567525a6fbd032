use quote::quote;
use syn::{
    AngleBracketedGenericArguments, Attribute, Expr, ExprLit, GenericArgument, Lit, Meta, Path,
    PathArguments, Type, TypePath,
};

/// Returns `T` when `ty` is `<wrapper><T>` spelled as `Wrapper<T>` or
/// `std::<module>::Wrapper<T>`.
fn inner_of_wrapper<'a>(ty: &'a Type, module: &str, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(TypePath { path, .. }) = ty else {
        return None;
    };

    let supported = match path.segments.len() {
        1 => path.segments[0].ident == wrapper,
        3 => {
            (path.segments[0].ident == "std"
                || path.segments[0].ident == "core"
                || path.segments[0].ident == "alloc")
                && path.segments[1].ident == module
                && path.segments[2].ident == wrapper
        }
        _ => false,
    };
    if !supported {
        return None;
    }

    if let Some(seg) = path.segments.last()
        && let PathArguments::AngleBracketed(AngleBracketedGenericArguments { args, .. }) =
            &seg.arguments
        && let Some(GenericArgument::Type(t)) = args.first()
    {
        return Some(t);
    }
    None
}

pub fn inner_of_option(ty: &Type) -> Option<&Type> {
    inner_of_wrapper(ty, "option", "Option")
}

pub fn inner_of_vec(ty: &Type) -> Option<&Type> {
    inner_of_wrapper(ty, "vec", "Vec")
}

pub fn is_bool(ty: &Type) -> bool {
    matches!(ty, Type::Path(TypePath { path, .. }) if path.is_ident("bool"))
}

/// Expression that turns the `raw: &str` in scope into a `T`, or returns an
/// `InvalidInput` error naming the option.
pub fn build_cli_parse_expr(ty: &Type, parse_with: Option<&Path>) -> proc_macro2::TokenStream {
    if let Some(parse_with) = parse_with {
        quote! { #parse_with(raw)? }
    } else {
        quote! {
            raw.trim().parse::<#ty>()
                .map_err(|e| crate::Error::invalid_input(format!(
                    "Invalid value for --{name}: {raw} ({e})"
                )))?
        }
    }
}

/// First line of the `///` docs on a field, trimmed.
pub fn doc_summary(attrs: &[Attribute]) -> String {
    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        if let Meta::NameValue(nv) = &attr.meta
            && let Expr::Lit(ExprLit {
                lit: Lit::Str(lit), ..
            }) = &nv.value
        {
            let line = lit.value().trim().to_string();
            if !line.is_empty() {
                return line;
            }
        }
    }
    String::new()
}

pub fn to_kebab_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (idx, ch) in s.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if idx != 0 {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else if ch == '_' {
            out.push('-');
        } else {
            out.push(ch);
        }
    }
    out
}
