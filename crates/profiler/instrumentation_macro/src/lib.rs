extern crate proc_macro;
use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input, parse_quote, Ident, ItemFn, Result,
};

/// Arguments of `#[profiler::function]`, currently only optional `pinned` flag.
struct FunctionArgs {
    pinned: bool,
}

impl Parse for FunctionArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.is_empty() {
            return Ok(FunctionArgs { pinned: false });
        }
        let ident: Ident = input.parse()?;
        if ident != "pinned" {
            return Err(syn::Error::new(ident.span(), "expected `pinned`"));
        }
        Ok(FunctionArgs { pinned: true })
    }
}

/// Wraps body of the function into a `profiler::scope!` named after the module path and function name.
#[proc_macro_attribute]
pub fn function(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as FunctionArgs);
    let mut function = parse_macro_input!(item as ItemFn);

    let name = function.sig.ident.to_string();
    let body = &function.block;

    let scoped_body = if args.pinned {
        parse_quote! {{
            profiler::scope!(concat!(module_path!(), "::", #name), pinned);
            #body
        }}
    } else {
        parse_quote! {{
            profiler::scope!(concat!(module_path!(), "::", #name));
            #body
        }}
    };
    function.block = Box::new(scoped_body);

    quote!(#function).into()
}
