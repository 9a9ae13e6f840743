use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

/// Derives `formbag::form::FormModel` for a struct with named fields.
///
/// Field order in the struct is the field order of the form: `data()`, `each()` and
/// `changed()` all walk the fields in declaration order. Every field type must be
/// `Clone + PartialEq + Serialize + DeserializeOwned`.
#[proc_macro_derive(FormModel)]
pub fn derive_form_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            input.ident,
            "FormModel derive currently supports only non-generic structs",
        )
        .to_compile_error()
        .into();
    }

    let model_ident = input.ident;
    let fields_struct_ident = format_ident!("{model_ident}Fields");

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return syn::Error::new(
                    model_ident.span(),
                    "FormModel derive requires a struct with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new(
                model_ident.span(),
                "FormModel derive is only supported on structs",
            )
            .to_compile_error()
            .into();
        }
    };

    let formbag = formbag_path();
    let json = quote!(#formbag::__private::serde_json);
    let mut lens_defs = Vec::new();
    let mut fields_methods = Vec::new();
    let mut key_consts = Vec::new();
    let mut value_arms = Vec::new();
    let mut set_value_arms = Vec::new();
    let mut eq_arms = Vec::new();
    let mut copy_arms = Vec::new();

    for field in named_fields {
        let Some(field_ident) = field.ident else {
            continue;
        };
        let field_ty = field.ty;
        let field_name = field_ident.unraw().to_string();
        let lens_ident = format_ident!("{model_ident}{}Lens", to_pascal_case(&field_name));

        lens_defs.push(quote! {
            #[derive(Clone, Copy, Debug, Default)]
            pub struct #lens_ident;

            impl #formbag::form::FieldLens<#model_ident> for #lens_ident {
                type Value = #field_ty;

                fn key(self) -> #formbag::form::FieldKey {
                    #formbag::form::FieldKey::new(#field_name)
                }

                fn get<'a>(self, model: &'a #model_ident) -> &'a Self::Value {
                    &model.#field_ident
                }

                fn set(self, model: &mut #model_ident, value: Self::Value) {
                    model.#field_ident = value;
                }
            }
        });

        fields_methods.push(quote! {
            pub const fn #field_ident(&self) -> #lens_ident {
                #lens_ident
            }
        });

        key_consts.push(quote! {
            #formbag::form::FieldKey::new(#field_name)
        });

        value_arms.push(quote! {
            #field_name => #json::to_value(&self.#field_ident).map(::core::option::Option::Some),
        });

        set_value_arms.push(quote! {
            #field_name => {
                self.#field_ident = #json::from_value(value)?;
                ::core::result::Result::Ok(true)
            }
        });

        eq_arms.push(quote! {
            #field_name => self.#field_ident == other.#field_ident,
        });

        copy_arms.push(quote! {
            #field_name => {
                self.#field_ident = ::core::clone::Clone::clone(&source.#field_ident);
                true
            }
        });
    }

    quote! {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct #fields_struct_ident;

        impl #fields_struct_ident {
            #(#fields_methods)*
        }

        impl #formbag::form::FormModel for #model_ident {
            type Fields = #fields_struct_ident;

            fn fields() -> Self::Fields {
                #fields_struct_ident
            }

            fn field_keys() -> &'static [#formbag::form::FieldKey] {
                const KEYS: &[#formbag::form::FieldKey] = &[#(#key_consts),*];
                KEYS
            }

            #[allow(unused_variables)]
            fn field_value(
                &self,
                key: &str,
            ) -> #json::Result<::core::option::Option<#json::Value>> {
                match key {
                    #(#value_arms)*
                    _ => ::core::result::Result::Ok(::core::option::Option::None),
                }
            }

            #[allow(unused_variables)]
            fn set_field_value(&mut self, key: &str, value: #json::Value) -> #json::Result<bool> {
                match key {
                    #(#set_value_arms)*
                    _ => ::core::result::Result::Ok(false),
                }
            }

            #[allow(unused_variables)]
            fn field_eq(&self, other: &Self, key: &str) -> bool {
                match key {
                    #(#eq_arms)*
                    _ => true,
                }
            }

            #[allow(unused_variables)]
            fn copy_field(&mut self, source: &Self, key: &str) -> bool {
                match key {
                    #(#copy_arms)*
                    _ => false,
                }
            }
        }

        #(#lens_defs)*
    }
    .into()
}

fn formbag_path() -> TokenStream2 {
    match crate_name("formbag") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) => quote!(crate),
        Err(_) => quote!(::formbag),
    }
}

fn to_pascal_case(input: &str) -> String {
    let mut out = String::new();
    for segment in input.split('_') {
        if segment.is_empty() {
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
