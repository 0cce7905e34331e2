mod argument;

pub use argument::{
    convert_argument_vector_to_map, make_choice_argument_of_model_objects, Argument,
    ArgumentError, ArgumentType, ArgumentValue, DomainType,
};
