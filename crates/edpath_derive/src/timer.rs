use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemFn, LitStr, parse_macro_input};

/// Wraps the function body with a drop guard that logs
/// `<label>: done secs=<elapsed>` at info level, including on early return.
pub fn timer_inner(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut func = parse_macro_input!(item as ItemFn);
    let label = if attr.is_empty() {
        func.sig.ident.to_string()
    } else {
        parse_macro_input!(attr as LitStr).value()
    };

    let body = &func.block;
    let wrapped = quote! {
        {
            struct __EdpathTimer(&'static str, std::time::Instant);

            impl Drop for __EdpathTimer {
                fn drop(&mut self) {
                    log::info!("{}: done secs={:.3}", self.0, self.1.elapsed().as_secs_f64());
                }
            }

            let __edpath_timer = __EdpathTimer(#label, std::time::Instant::now());
            #body
        }
    };

    func.block = match syn::parse2(wrapped) {
        Ok(block) => Box::new(block),
        Err(err) => return err.to_compile_error().into(),
    };

    TokenStream::from(quote! { #func })
}
